use glam::Vec2;

/// Identity of a prop inside one scene's scenegraph.
pub type PropKey = u32;

/// The drawing surface the scene renders against. The concrete canvas
/// library lives outside the engine; anything that can draw lines,
/// polygons and sprites can host a scene.
pub trait DrawSurface {
    /// Drops all previously drawn grid geometry. Called at the start of
    /// every grid rebuild so repeated rebuilds never accumulate state.
    fn clear_grid(&mut self);
    fn line(&mut self, from: Vec2, to: Vec2);
    fn polygon(&mut self, points: &[Vec2]);
    /// The scene background extent.
    fn rect(&mut self, origin: Vec2, size: Vec2);
    fn place_sprite(&mut self, key: PropKey, image_ref: &str, position: Vec2);
    fn move_sprite(&mut self, key: PropKey, position: Vec2);
    fn remove_sprite(&mut self, key: PropKey);
    /// The pointer affordance toggled by Pan mode.
    fn set_button_mode(&mut self, enabled: bool);
    fn set_viewport(&mut self, offset: Vec2);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Up,
    /// The pointer was released outside the element bounds. Handled
    /// exactly like Up so a drag always terminates.
    UpOutside,
    Move,
}

/// A pointer event as delivered by the hosting canvas. `target` is set
/// when the event started on a prop sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Vec2,
    pub target: Option<PropKey>,
}

/// Everything a surface was asked to draw, verbatim. Backs the tests and
/// the scene-demo command.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    ClearGrid,
    Line { from: Vec2, to: Vec2 },
    Polygon { points: Vec<Vec2> },
    Rect { origin: Vec2, size: Vec2 },
    PlaceSprite { key: PropKey, image_ref: String, position: Vec2 },
    MoveSprite { key: PropKey, position: Vec2 },
    RemoveSprite { key: PropKey },
    SetButtonMode { enabled: bool },
    SetViewport { offset: Vec2 },
}

/// A surface that records instead of drawing.
#[derive(Default)]
pub struct RecordingSurface {
    pub commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        RecordingSurface::default()
    }

    /// The commands drawn since the last `clear_grid`, i.e. the current
    /// grid geometry.
    pub fn current_grid(&self) -> &[SurfaceCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|command| *command == SurfaceCommand::ClearGrid)
            .map(|index| index + 1)
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl DrawSurface for RecordingSurface {
    fn clear_grid(&mut self) {
        self.commands.push(SurfaceCommand::ClearGrid);
    }

    fn line(&mut self, from: Vec2, to: Vec2) {
        self.commands.push(SurfaceCommand::Line { from, to });
    }

    fn polygon(&mut self, points: &[Vec2]) {
        self.commands.push(SurfaceCommand::Polygon {
            points: points.to_vec(),
        });
    }

    fn rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(SurfaceCommand::Rect { origin, size });
    }

    fn place_sprite(&mut self, key: PropKey, image_ref: &str, position: Vec2) {
        self.commands.push(SurfaceCommand::PlaceSprite {
            key,
            image_ref: image_ref.to_string(),
            position,
        });
    }

    fn move_sprite(&mut self, key: PropKey, position: Vec2) {
        self.commands.push(SurfaceCommand::MoveSprite { key, position });
    }

    fn remove_sprite(&mut self, key: PropKey) {
        self.commands.push(SurfaceCommand::RemoveSprite { key });
    }

    fn set_button_mode(&mut self, enabled: bool) {
        self.commands.push(SurfaceCommand::SetButtonMode { enabled });
    }

    fn set_viewport(&mut self, offset: Vec2) {
        self.commands.push(SurfaceCommand::SetViewport { offset });
    }
}
