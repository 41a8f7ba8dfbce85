pub const SWIPE_THRESHOLD: f64 = 90.0;
pub const ROTATION_DIVISOR: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Reject,
    Accept,
    SuperLike,
}

impl Verdict {
    pub fn exit_transform(self) -> &'static str {
        match self {
            Verdict::Reject => "translateX(-120%) rotate(-12deg)",
            Verdict::Accept => "translateX(120%) rotate(12deg)",
            Verdict::SuperLike => "translateY(-120%)",
        }
    }

    pub fn stamp(self) -> &'static str {
        match self {
            Verdict::Reject => "NOPE",
            Verdict::Accept => "LIKE",
            Verdict::SuperLike => "SUPER",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Verdict::Reject => "reject",
            Verdict::Accept => "accept",
            Verdict::SuperLike => "super-like",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub pointer_id: i32,
    pub start_x: f64,
    pub start_y: f64,
    pub current_x: f64,
    pub current_y: f64,
}

impl DragState {
    pub fn new(pointer_id: i32, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            start_x: x,
            start_y: y,
            current_x: x,
            current_y: y,
        }
    }

    pub fn track(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;
    }

    pub fn delta(&self) -> (f64, f64) {
        (self.current_x - self.start_x, self.current_y - self.start_y)
    }
}

/// Horizontal thresholds are checked before the upward one, so a drag that is
/// far enough left and up at once is a reject.
pub fn classify_release(dx: f64, dy: f64, threshold: f64) -> Option<Verdict> {
    if dx <= -threshold {
        Some(Verdict::Reject)
    } else if dx >= threshold {
        Some(Verdict::Accept)
    } else if dy <= -threshold {
        Some(Verdict::SuperLike)
    } else {
        None
    }
}

pub fn drag_transform(dx: f64, dy: f64, rotation_divisor: f64) -> String {
    format!(
        "translate({:.1}px, {:.1}px) rotate({:.2}deg)",
        dx,
        dy,
        dx / rotation_divisor
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragHint {
    pub verdict: Verdict,
    pub strength: f64,
}

pub fn drag_hint(dx: f64, dy: f64, threshold: f64) -> Option<DragHint> {
    let horizontal = (dx.abs() / threshold).clamp(0.0, 1.0);
    let upward = (-dy / threshold).clamp(0.0, 1.0);

    let (verdict, strength) = if horizontal >= 1.0 || (horizontal >= upward && dx != 0.0) {
        let verdict = if dx < 0.0 {
            Verdict::Reject
        } else {
            Verdict::Accept
        };
        (verdict, horizontal)
    } else {
        (Verdict::SuperLike, upward)
    };

    if strength < 0.01 {
        return None;
    }
    Some(DragHint { verdict, strength })
}
