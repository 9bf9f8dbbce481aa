use serde::{Deserialize, Serialize};

/// Per-tick movement intent for the player body.
///
/// `forward` and `strafe` are -1, 0, or 1 and are rotated by `camera_yaw`
/// into world space, so movement stays camera-relative. `jump` is an edge
/// trigger: report a held key once per press, not once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub forward: i8,
    pub strafe: i8,
    pub sprint: bool,
    pub jump: bool,
    pub camera_yaw: f32,
}

impl MoveIntent {
    pub const fn neutral() -> Self {
        Self {
            forward: 0,
            strafe: 0,
            sprint: false,
            jump: false,
            camera_yaw: 0.0,
        }
    }

    pub fn has_movement(&self) -> bool {
        self.forward != 0 || self.strafe != 0
    }
}
