use crate::error::OutOfRange;

/// Index of the visible card. Equal to the buffer length when there is no
/// current card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    index: usize,
}

impl Position {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves one card forward unless already past the end.
    pub fn advance(&mut self, len: usize) -> bool {
        if self.index < len {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, index: usize, len: usize) -> Result<(), OutOfRange> {
        if index >= len {
            return Err(OutOfRange { index, len });
        }
        self.index = index;
        Ok(())
    }

    pub fn remaining(&self, len: usize) -> usize {
        len.saturating_sub(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_stops_at_the_end() {
        let mut position = Position::default();
        assert!(position.advance(2));
        assert!(position.advance(2));
        assert!(!position.advance(2));
        assert_eq!(position.index(), 2);
        assert_eq!(position.remaining(2), 0);
    }

    #[test]
    fn go_to_rejects_indices_outside_the_buffer() {
        let mut position = Position::default();
        assert_eq!(position.go_to(3, 3), Err(OutOfRange { index: 3, len: 3 }));
        assert_eq!(position.index(), 0);
        position.go_to(2, 3).unwrap();
        assert_eq!(position.remaining(3), 1);
    }

    #[test]
    fn empty_buffer_has_nothing_remaining() {
        let mut position = Position::default();
        assert!(!position.advance(0));
        assert_eq!(position.remaining(0), 0);
    }
}
