/// Clamp `cursor` into `0..len` and move `scroll` the least amount that
/// keeps the cursor inside a window of `height` rows.
pub fn reconcile(len: usize, cursor: usize, scroll: usize, height: usize) -> (usize, usize) {
    if len == 0 {
        return (0, 0);
    }
    let height = height.max(1);
    let cursor = cursor.min(len - 1);
    let scroll = if cursor < scroll {
        cursor
    } else if cursor >= scroll + height {
        cursor + 1 - height
    } else {
        scroll
    };
    (cursor, scroll)
}

/// Cursor and scroll offset over a list.
///
/// Navigation only moves the cursor; [`Viewport::reconcile`] is the one
/// place the scroll offset changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub cursor: usize,
    pub scroll: usize,
}

impl Viewport {
    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn top(&mut self) {
        self.cursor = 0;
    }

    pub fn bottom(&mut self, len: usize) {
        self.cursor = len.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn reconcile(&mut self, len: usize, height: usize) {
        (self.cursor, self.scroll) = reconcile(len, self.cursor, self.scroll, height);
    }
}
