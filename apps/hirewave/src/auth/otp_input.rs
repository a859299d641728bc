pub const OTP_LENGTH: usize = 6;

/// Six single-digit boxes plus the index of the focused one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    digits: [Option<char>; OTP_LENGTH],
    focus: usize,
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn set_focus(&mut self, index: usize) {
        self.focus = index.min(OTP_LENGTH - 1);
    }

    pub fn digits(&self) -> &[Option<char>; OTP_LENGTH] {
        &self.digits
    }

    /// Fills the focused box and moves to the next one. Non-digits are
    /// refused and leave everything untouched.
    pub fn type_digit(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() {
            return false;
        }
        self.digits[self.focus] = Some(c);
        if self.focus < OTP_LENGTH - 1 {
            self.focus += 1;
        }
        true
    }

    /// Clears the focused box, or steps back when it is already empty.
    pub fn backspace(&mut self) {
        if self.digits[self.focus].is_some() {
            self.digits[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// Distributes pasted digits from the first box.
    ///
    /// A full code fills every box and focuses the last one; a shorter run
    /// fills a prefix, keeps the remaining boxes and focuses the first empty
    /// box. Anything with a non-digit, or longer than the code, is ignored.
    pub fn paste(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || text.len() > OTP_LENGTH || !text.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        for (slot, c) in self.digits.iter_mut().zip(text.chars()) {
            *slot = Some(c);
        }

        self.focus = self
            .digits
            .iter()
            .position(Option::is_none)
            .unwrap_or(OTP_LENGTH - 1);
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    /// The digits entered so far, in box order.
    pub fn code(&self) -> String {
        self.digits.iter().flatten().collect()
    }
}
