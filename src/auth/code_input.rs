//! One-time-code entry grid: a fixed row of single-digit cells with
//! auto-advancing focus, backspace-to-previous and paste splitting.

use thiserror::Error;

/// Number of digits in a verification code
pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("Please enter the complete {expected}-digit code!")]
    Incomplete { expected: usize, filled: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeCell {
    digit: Option<char>,
}

impl CodeCell {
    pub fn value(&self) -> Option<char> {
        self.digit
    }

    /// The filled marker: set exactly when the cell holds a digit
    pub fn is_filled(&self) -> bool {
        self.digit.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct CodeInput {
    cells: Vec<CodeCell>,
    focus: usize,
}

impl Default for CodeInput {
    fn default() -> Self {
        Self::new(CODE_LENGTH)
    }
}

impl CodeInput {
    /// Create an empty group; focus starts on the first cell
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![CodeCell::default(); len.max(1)],
            focus: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[CodeCell] {
        &self.cells
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn set_focus(&mut self, index: usize) {
        self.focus = index.min(self.cells.len() - 1);
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus + 1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    /// Replace the value of cell `index` with whatever digits `raw` holds.
    ///
    /// Non-digits are dropped and only the first digit is kept. A filled
    /// cell hands focus to the next one unless it is the last.
    pub fn input(&mut self, index: usize, raw: &str) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        cell.digit = raw.chars().find(|c| c.is_ascii_digit());

        if cell.digit.is_some() && index + 1 < self.cells.len() {
            self.focus = index + 1;
        }
    }

    /// Backspace pressed in cell `index`.
    ///
    /// An empty cell moves focus back without touching the previous cell;
    /// a filled cell is cleared in place. Returns true if focus moved.
    pub fn backspace(&mut self, index: usize) -> bool {
        let Some(cell) = self.cells.get(index) else {
            return false;
        };
        if cell.is_filled() {
            self.input(index, "");
            return false;
        }
        if index > 0 {
            self.focus = index - 1;
            return true;
        }
        false
    }

    /// Spread pasted digits across the group starting at the first cell.
    ///
    /// Cells past the pasted length keep their current value.
    pub fn paste(&mut self, clipboard: &str) {
        let digits: Vec<char> = clipboard
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(self.cells.len())
            .collect();

        for (cell, digit) in self.cells.iter_mut().zip(&digits) {
            cell.digit = Some(*digit);
        }
        self.focus = digits.len().min(self.cells.len() - 1);
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| c.digit = None);
        self.focus = 0;
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// Complete when every cell holds a digit
    pub fn is_complete(&self) -> bool {
        self.filled() == self.cells.len()
    }

    /// Concatenation of all cells in order (empty cells contribute nothing)
    pub fn code(&self) -> String {
        self.cells.iter().filter_map(|c| c.digit).collect()
    }

    /// The code ready for submission
    pub fn assemble(&self) -> Result<String, CodeError> {
        let code = self.code();
        if code.len() != self.cells.len() {
            return Err(CodeError::Incomplete {
                expected: self.cells.len(),
                filled: code.len(),
            });
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(group: &CodeInput) -> Vec<String> {
        group
            .cells()
            .iter()
            .map(|c| c.value().map(String::from).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_starts_focused_on_first_cell() {
        let group = CodeInput::default();
        assert_eq!(group.len(), CODE_LENGTH);
        assert_eq!(group.focus(), 0);
        assert!(!group.is_complete());
    }

    #[test]
    fn test_paste_splits_digits() {
        let mut group = CodeInput::new(6);
        group.paste("12-34X5");
        assert_eq!(values(&group), vec!["1", "2", "3", "4", "5", ""]);
        assert_eq!(group.focus(), 4);
        assert_eq!(group.filled(), 5);
    }

    #[test]
    fn test_paste_truncates_to_group_size() {
        let mut group = CodeInput::new(6);
        group.paste("987654321");
        assert_eq!(group.code(), "987654");
        assert_eq!(group.focus(), 5);
        assert!(group.is_complete());
    }

    #[test]
    fn test_paste_without_digits_focuses_first() {
        let mut group = CodeInput::new(6);
        group.set_focus(3);
        group.paste("abc");
        assert_eq!(group.focus(), 0);
        assert_eq!(group.filled(), 0);
    }

    #[test]
    fn test_typing_advances_focus() {
        let mut group = CodeInput::new(6);
        for i in 0..5 {
            group.input(i, "7");
            assert!(group.cells()[i].is_filled());
            assert_eq!(group.focus(), i + 1);
        }
        // Last cell keeps focus
        group.input(5, "7");
        assert_eq!(group.focus(), 5);
        assert!(group.is_complete());
    }

    #[test]
    fn test_non_digit_input_empties_cell() {
        let mut group = CodeInput::new(6);
        group.input(2, "4");
        group.input(2, "x");
        assert!(!group.cells()[2].is_filled());
        assert_eq!(group.focus(), 3);
    }

    #[test]
    fn test_input_strips_non_digits() {
        let mut group = CodeInput::new(6);
        group.input(0, "a8");
        assert_eq!(group.cells()[0].value(), Some('8'));
        assert_eq!(group.focus(), 1);
    }

    #[test]
    fn test_backspace_on_empty_moves_back() {
        let mut group = CodeInput::new(6);
        group.input(0, "1");
        group.input(1, "2");
        group.set_focus(2);

        assert!(group.backspace(2));
        assert_eq!(group.focus(), 1);
        assert_eq!(group.cells()[1].value(), Some('2'));
    }

    #[test]
    fn test_backspace_on_filled_clears_in_place() {
        let mut group = CodeInput::new(6);
        group.input(0, "1");
        group.input(1, "2");
        group.set_focus(1);

        assert!(!group.backspace(1));
        assert_eq!(group.focus(), 1);
        assert!(!group.cells()[1].is_filled());
    }

    #[test]
    fn test_backspace_on_first_empty_cell_stays() {
        let mut group = CodeInput::new(6);
        assert!(!group.backspace(0));
        assert_eq!(group.focus(), 0);
    }

    #[test]
    fn test_assemble() {
        let mut group = CodeInput::new(6);
        for (i, d) in ["0", "9", "1", "2", "3", "4"].iter().enumerate() {
            group.input(i, d);
        }
        assert_eq!(group.assemble(), Ok("091234".to_string()));

        group.backspace(3);
        assert_eq!(
            group.assemble(),
            Err(CodeError::Incomplete { expected: 6, filled: 5 })
        );
    }
}
