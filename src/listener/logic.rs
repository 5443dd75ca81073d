#[derive(Debug, Clone, PartialEq)]
struct LogicFrame {
    name: String,
    open_paren_count: usize,
}

/// Defers `AND`/`OR` until the item to their left is complete.
///
/// A frame is pushed for each logical node and emitted after the next
/// non-logical item, unless that item opened a parenthesis group: then the
/// frame waits until the group is closed again.
#[derive(Debug, Default)]
pub struct LogicDepthStack {
    frames: Vec<LogicFrame>,
}

impl LogicDepthStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.frames.push(LogicFrame {
            name: name.to_uppercase(),
            open_paren_count: 0,
        });
    }

    pub fn open_paren(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.open_paren_count += 1;
        }
    }

    pub fn close_paren(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.open_paren_count = frame.open_paren_count.saturating_sub(1);
        }
    }

    /// Pops the top operator when its paren groups are all closed.
    pub fn take_ready(&mut self) -> Option<String> {
        if self.frames.last()?.open_paren_count != 0 {
            return None;
        }
        self.frames.pop().map(|frame| frame.name)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
