//! Tool kinds and the capability queries the input handlers rely on.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Active tool of the canvas.
///
/// Tool state itself is owned by the host; handlers only read it and ask the
/// host to switch to bound tools while a button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    Pen,
    Eraser,
    Highlighter,
    Text,
    Image,
    SelectRect,
    SelectRegion,
    SelectObject,
    PlayObject,
    VerticalSpace,
    /// Drags the view instead of drawing
    Hand,
    DrawRect,
    DrawEllipse,
    DrawArrow,
    DrawDoubleArrow,
    DrawCoordinateSystem,
    DrawSpline,
    FloatingToolbox,
    LaserPointer,
}

/// Shape modifier of the pen and highlighter tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawingType {
    /// Freehand stroke
    #[default]
    Default,
    Line,
    Rectangle,
    Ellipse,
    Arrow,
    DoubleArrow,
    CoordinateSystem,
    Spline,
    ShapeRecognizer,
}

impl DrawingType {
    fn is_shape(self) -> bool {
        !matches!(self, DrawingType::Default | DrawingType::ShapeRecognizer)
    }
}

impl ToolType {
    /// Tools whose strokes are recorded as ink on a page.
    pub fn is_drawing_tool(self) -> bool {
        matches!(
            self,
            ToolType::Pen | ToolType::Highlighter | ToolType::Eraser
        )
    }

    /// Tools for which a very short, still contact is a tap rather than a stroke.
    pub fn supports_tap_filter(self) -> bool {
        matches!(
            self,
            ToolType::Pen | ToolType::Highlighter | ToolType::Eraser
        )
    }

    /// Tools whose action always stays on the page it started on.
    pub fn is_single_page_tool(self, drawing_type: DrawingType) -> bool {
        match self {
            ToolType::Pen | ToolType::Highlighter => drawing_type.is_shape(),
            ToolType::SelectRect
            | ToolType::SelectRegion
            | ToolType::SelectObject
            | ToolType::DrawRect
            | ToolType::DrawEllipse
            | ToolType::DrawArrow
            | ToolType::DrawDoubleArrow
            | ToolType::DrawCoordinateSystem
            | ToolType::DrawSpline
            | ToolType::FloatingToolbox
            | ToolType::VerticalSpace => true,
            _ => false,
        }
    }
}

/// Physical button a tool binding is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Button {
    MouseMiddle,
    MouseRight,
    Eraser,
    StylusOne,
    StylusTwo,
    Touch,
}
