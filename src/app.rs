use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

use crate::auth::code_input::{CodeInput, CODE_LENGTH};
use crate::auth::countdown::{CountdownTarget, Countdowns, Displays};
use crate::auth::phone::{self, format_phone_number};
use crate::auth::session::{SessionKey, SessionStore};
use crate::config::AppConfig;
use crate::messages::{MessageKind, Messages};
use crate::theme::ThemeMode;

/// Default length of the slide-out before a page switch
pub const NAVIGATION_DELAY: Duration = Duration::from_millis(500);

/// Delay before the card is marked loaded (fade-in)
const LOAD_DELAY: Duration = Duration::from_millis(100);

/// Simulated server round trip for code checks
const SERVER_DELAY: Duration = Duration::from_millis(1000);

/// Pause between a success message and the follow-up step
const FOLLOW_UP_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Page {
    Signup,
    #[value(skip)]
    Verify,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Fullname,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Phone,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Work queued to run after a delay, fired from `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    MarkLoaded,
    BeginNavigation { page: Page, delay: Duration },
    EnterPage(Page),
    AccountCreated,
    SignedIn,
    LoginFinished,
    FocusLoginCode,
}

impl Deferred {
    /// Work tied to the page on screen, dropped when navigating away
    fn is_page_bound(self) -> bool {
        !matches!(self, Deferred::MarkLoaded)
    }
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    action: Deferred,
}

/// Settings given on the command line for this run only. Never saved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub theme: Option<ThemeMode>,
    pub resend_seconds: Option<u32>,
}

pub struct App {
    pub page: Page,
    pub popup: Popup,
    pub theme: ThemeMode,
    pub resend_seconds: u32,
    config_path: Option<PathBuf>,

    // Card animation state
    pub loaded: bool,
    pub leaving: bool,
    /// A submit is waiting on its deferred result
    pub submitting: bool,

    // Signup form
    pub fullname: String,
    pub signup_phone: String,
    pub signup_field: SignupField,

    // Verify page
    pub code: CodeInput,
    pub phone_display: Option<String>,

    // Login form
    pub login_step: LoginStep,
    pub login_phone: String,
    pub login_code: String,
    pub login_code_focused: bool,
    pub signed_in: bool,

    pub session: SessionStore,
    pub messages: Messages,
    pub displays: Displays,
    countdowns: Countdowns,
    scheduled: Vec<Scheduled>,
}

impl App {
    /// Build the app and enter `page`. Needs a running tokio runtime.
    pub fn new(config: AppConfig, overrides: Overrides, page: Page) -> Result<Self> {
        let mut app = Self {
            page,
            popup: Popup::None,
            theme: overrides.theme.unwrap_or(config.theme),
            resend_seconds: overrides.resend_seconds.unwrap_or(config.resend_seconds),
            countdowns: Countdowns::new(config.countdown_suffix),
            config_path: None,

            loaded: false,
            leaving: false,
            submitting: false,

            fullname: String::new(),
            signup_phone: String::new(),
            signup_field: SignupField::Fullname,

            code: CodeInput::new(CODE_LENGTH),
            phone_display: None,

            login_step: LoginStep::Phone,
            login_phone: String::new(),
            login_code: String::new(),
            login_code_focused: false,
            signed_in: false,

            session: SessionStore::default(),
            messages: Messages::default(),
            displays: Displays::default(),
            scheduled: Vec::new(),
        };

        app.enter_page(page)?;
        app.defer(LOAD_DELAY, Deferred::MarkLoaded);
        Ok(app)
    }

    /// Persist config somewhere other than the user config dir
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Write the theme into the saved config, leaving every other saved value as it is
    fn save_theme(&self) -> Result<()> {
        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => AppConfig::config_path()?,
        };
        let mut saved = AppConfig::load_from(&path)?;
        saved.theme = self.theme;
        saved.save_to(&path)
    }

    fn show(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.messages.show(text, kind);
    }

    fn defer(&mut self, after: Duration, action: Deferred) {
        self.scheduled.push(Scheduled {
            due: Instant::now() + after,
            action,
        });
    }

    pub fn toggle_theme(&mut self) -> Result<()> {
        self.theme = self.theme.toggled();
        tracing::info!("Theme switched to {:?}", self.theme);
        self.save_theme()
    }

    /// Slide the card out, then switch to `page` after `delay`
    /// Any earlier pending navigation or page work is dropped.
    pub fn navigate_with_animation(&mut self, page: Page, delay: Duration) {
        self.drop_page_work();
        self.leaving = true;
        self.defer(delay, Deferred::EnterPage(page));
    }

    fn drop_page_work(&mut self) {
        let before = self.scheduled.len();
        self.scheduled.retain(|s| !s.action.is_page_bound());
        let dropped = before - self.scheduled.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} pending page action(s)", dropped);
        }
    }

    fn leave_page(&mut self) {
        self.drop_page_work();
        self.submitting = false;
        for target in [CountdownTarget::Verify, CountdownTarget::Login] {
            self.countdowns.cancel(target);
            self.displays.unmount(target);
        }
    }

    fn enter_page(&mut self, page: Page) -> Result<()> {
        self.leave_page();
        self.leaving = false;
        self.page = page;
        tracing::debug!("Entering {:?} page", page);

        match page {
            Page::Signup => {
                self.signup_field = SignupField::Fullname;
            }
            Page::Verify => {
                let Some(stored) = self.session.get(SessionKey::SignupPhone) else {
                    self.phone_display = None;
                    self.navigate_with_animation(Page::Signup, Duration::from_millis(300));
                    return Ok(());
                };
                self.phone_display = Some(phone::display_phone(stored));
                self.code.clear();
                self.displays.mount(CountdownTarget::Verify, true);
                self.countdowns.start(
                    CountdownTarget::Verify,
                    self.resend_seconds,
                    &mut self.displays,
                )?;
            }
            Page::Login => {
                self.login_step = LoginStep::Phone;
                self.login_code.clear();
                self.login_code_focused = false;
                self.signed_in = false;
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup == Popup::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('t') => self.toggle_theme()?,
                KeyCode::Char('r') => self.resend_code()?,
                KeyCode::Char('n') => self.switch_form(),
                _ => {}
            }
            return Ok(());
        }

        if key.code == KeyCode::F(1) {
            self.popup = Popup::Help;
            return Ok(());
        }

        // Card is on its way out
        if self.leaving {
            return Ok(());
        }

        match self.page {
            Page::Signup => self.handle_signup_key(key),
            Page::Verify => self.handle_verify_key(key),
            Page::Login => self.handle_login_key(key),
        }
    }

    /// Bracketed paste from the terminal
    pub fn handle_paste(&mut self, text: &str) {
        if self.leaving || self.popup != Popup::None {
            return;
        }
        match self.page {
            Page::Signup => match self.signup_field {
                SignupField::Fullname => self.fullname.push_str(text.trim_end_matches(['\r', '\n'])),
                SignupField::Phone => {
                    self.signup_phone = format_phone_number(&format!("{}{}", self.signup_phone, text));
                }
            },
            Page::Verify => self.code.paste(text),
            Page::Login => match self.login_step {
                LoginStep::Phone => {
                    self.login_phone = format_phone_number(&format!("{}{}", self.login_phone, text));
                }
                LoginStep::Code => {
                    let combined = format!("{}{}", self.login_code, text);
                    self.login_code = digits_only(&combined, CODE_LENGTH);
                }
            },
        }
    }

    fn switch_form(&mut self) {
        if self.leaving {
            return;
        }
        let target = match self.page {
            Page::Login => Page::Signup,
            Page::Signup | Page::Verify => Page::Login,
        };
        self.navigate_with_animation(target, NAVIGATION_DELAY);
    }

    fn handle_signup_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.signup_field = match self.signup_field {
                    SignupField::Fullname => SignupField::Phone,
                    SignupField::Phone => SignupField::Fullname,
                };
            }
            KeyCode::Enter => self.submit_signup(),
            KeyCode::Backspace => match self.signup_field {
                SignupField::Fullname => {
                    self.fullname.pop();
                }
                SignupField::Phone => {
                    self.signup_phone.pop();
                    self.signup_phone = format_phone_number(&self.signup_phone);
                }
            },
            KeyCode::Char(c) => match self.signup_field {
                SignupField::Fullname => self.fullname.push(c),
                SignupField::Phone => {
                    self.signup_phone.push(c);
                    self.signup_phone = format_phone_number(&self.signup_phone);
                }
            },
            _ => {}
        }
        Ok(())
    }

    fn submit_signup(&mut self) {
        if self.submitting {
            return;
        }
        let fullname = self.fullname.trim().to_string();
        let phone = self.signup_phone.trim().to_string();

        if let Err(e) = phone::validate_fullname(&fullname)
            .and_then(|_| phone::validate_phone(&phone))
        {
            self.show(e.to_string(), MessageKind::Error);
            return;
        }

        self.session.set(SessionKey::SignupPhone, phone);
        self.session.set(SessionKey::SignupFullname, fullname);

        self.submitting = true;
        self.show("Sending verification code...", MessageKind::Info);
        self.defer(
            Duration::from_millis(500),
            Deferred::BeginNavigation {
                page: Page::Verify,
                delay: Duration::from_millis(800),
            },
        );
    }

    fn handle_verify_key(&mut self, key: KeyEvent) -> Result<()> {
        let focus = self.code.focus();
        match key.code {
            KeyCode::Enter => self.submit_verify(),
            KeyCode::Backspace => {
                self.code.backspace(focus);
            }
            KeyCode::Delete => self.code.input(focus, ""),
            KeyCode::Left | KeyCode::BackTab => self.code.focus_prev(),
            KeyCode::Right | KeyCode::Tab => self.code.focus_next(),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.code.input(focus, c.encode_utf8(&mut [0; 4]));
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_verify(&mut self) {
        if self.submitting {
            return;
        }
        if let Err(e) = self.code.assemble() {
            self.show(e.to_string(), MessageKind::Error);
            return;
        }

        self.submitting = true;
        self.show("Verifying code...", MessageKind::Info);
        self.defer(SERVER_DELAY, Deferred::AccountCreated);
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Result<()> {
        match (self.login_step, key.code) {
            (LoginStep::Phone, KeyCode::Enter) => self.submit_login_phone()?,
            (LoginStep::Phone, KeyCode::Backspace) => {
                self.login_phone.pop();
                self.login_phone = format_phone_number(&self.login_phone);
            }
            (LoginStep::Phone, KeyCode::Char(c)) => {
                self.login_phone.push(c);
                self.login_phone = format_phone_number(&self.login_phone);
            }
            (LoginStep::Code, KeyCode::Enter) => self.submit_login_code(),
            (LoginStep::Code, KeyCode::Backspace) => {
                self.login_code.pop();
            }
            (LoginStep::Code, KeyCode::Char(c)) => {
                self.login_code.push(c);
                self.login_code = digits_only(&self.login_code, CODE_LENGTH);
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_login_phone(&mut self) -> Result<()> {
        let phone = self.login_phone.trim().to_string();
        if let Err(e) = phone::validate_phone(&phone) {
            self.show(e.to_string(), MessageKind::Error);
            return Ok(());
        }

        self.session.set(SessionKey::LoginPhone, phone);
        self.login_step = LoginStep::Code;
        self.show("Verification code sent!", MessageKind::Success);

        self.displays.mount(CountdownTarget::Login, true);
        self.countdowns.start(
            CountdownTarget::Login,
            self.resend_seconds,
            &mut self.displays,
        )?;

        self.defer(Duration::from_millis(300), Deferred::FocusLoginCode);
        Ok(())
    }

    fn submit_login_code(&mut self) {
        if self.submitting {
            return;
        }
        if self.login_code.trim().len() != CODE_LENGTH {
            self.show(format!("Code must be {} digits!", CODE_LENGTH), MessageKind::Error);
            return;
        }

        self.submitting = true;
        self.show("Signing in...", MessageKind::Info);
        self.defer(SERVER_DELAY, Deferred::SignedIn);
    }

    /// The countdown target resend applies to on the current page
    fn resend_target(&self) -> Option<CountdownTarget> {
        match (self.page, self.login_step) {
            (Page::Verify, _) => Some(CountdownTarget::Verify),
            (Page::Login, LoginStep::Code) => Some(CountdownTarget::Login),
            _ => None,
        }
    }

    /// Resend the code and restart the countdown.
    /// Refused while the resend control is still disabled.
    pub fn resend_code(&mut self) -> Result<()> {
        let Some(target) = self.resend_target() else {
            return Ok(());
        };
        let Some(view) = self.displays.get(target) else {
            return Ok(());
        };
        if !view.resend_enabled() {
            self.show("Please wait until the countdown ends", MessageKind::Warning);
            return Ok(());
        }

        self.show("Verification code resent!", MessageKind::Success);
        self.countdowns
            .start(target, self.resend_seconds, &mut self.displays)?;
        Ok(())
    }

    fn run_deferred(&mut self, action: Deferred) -> Result<()> {
        match action {
            Deferred::MarkLoaded => self.loaded = true,
            Deferred::BeginNavigation { page, delay } => self.navigate_with_animation(page, delay),
            Deferred::EnterPage(page) => self.enter_page(page)?,
            Deferred::AccountCreated => {
                self.show("Your account was created successfully!", MessageKind::Success);
                self.session.remove(SessionKey::SignupPhone);
                self.session.remove(SessionKey::SignupFullname);
                self.defer(
                    FOLLOW_UP_DELAY,
                    Deferred::BeginNavigation {
                        page: Page::Login,
                        delay: Duration::from_millis(1000),
                    },
                );
            }
            Deferred::SignedIn => {
                self.show("Signed in successfully!", MessageKind::Success);
                self.session.remove(SessionKey::LoginPhone);
                self.defer(FOLLOW_UP_DELAY, Deferred::LoginFinished);
            }
            Deferred::LoginFinished => {
                self.signed_in = true;
                tracing::info!("Login successful!");
            }
            Deferred::FocusLoginCode => self.login_code_focused = true,
        }
        Ok(())
    }

    /// Apply countdown ticks, fire due deferred work and expire messages.
    ///
    /// Every due action runs even if an earlier one fails; the first error
    /// is returned after the queue has been worked through.
    pub fn tick(&mut self) -> Result<()> {
        let now = Instant::now();
        self.countdowns.drain(&mut self.displays);
        self.messages.expire(now);

        // Taken one at a time: an action may queue more work or drop the rest
        let mut first_error = None;
        while let Some(index) = self.next_due(now) {
            let scheduled = self.scheduled.remove(index);
            if let Err(e) = self.run_deferred(scheduled.action) {
                tracing::warn!("{:?} failed: {:#}", scheduled.action, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Earliest due entry, oldest first among equal deadlines
    fn next_due(&self, now: Instant) -> Option<usize> {
        self.scheduled
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| s.due)
            .map(|(index, _)| index)
    }

    pub fn countdown_text(&self, target: CountdownTarget) -> &str {
        self.displays
            .get(target)
            .map(|v| v.text.as_str())
            .unwrap_or("")
    }
}

fn digits_only(s: &str, max: usize) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}
