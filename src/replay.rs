//! Offline replay of recorded event traces.
//!
//! A trace is a JSON file with a page layout and a list of raw toolkit
//! events. Replaying feeds the events through an [`InputContext`] backed by
//! [`RecordingHost`], which records every callback instead of drawing. This
//! is how input issues get reproduced without hardware, and what the
//! `penflow replay` command prints.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use kurbo::{Point, Rect, Vec2};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::input::{
    Canvas, DrawingType, HandRecognition, InputContext, PageIndex, PositionInputData,
    RawInputEvent, SelectionGrip, ToolHandler, ToolType, UndoControl, ZoomControl,
};

/// Errors that can occur while loading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Failed to read trace {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse trace {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Trace has no pages")]
    NoPages,
}

/// Page-relative position reported in a callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CallbackPosition {
    pub x: f64,
    pub y: f64,
    /// `None` when the device reported no pressure
    pub pressure: Option<f64>,
}

impl From<&PositionInputData> for CallbackPosition {
    fn from(pos: &PositionInputData) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            pressure: pos.has_pressure().then_some(pos.pressure),
        }
    }
}

/// One observable effect of input handling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "callback", rename_all = "snake_case")]
pub enum Callback {
    ButtonPress { page: usize, pos: CallbackPosition },
    Motion { page: usize, pos: CallbackPosition },
    ButtonRelease { page: usize, pos: CallbackPosition },
    Tap { page: usize, pos: CallbackPosition },
    DoublePress { page: usize, pos: CallbackPosition },
    TriplePress { page: usize, pos: CallbackPosition },
    ButtonClick { page: usize, pos: CallbackPosition },
    SequenceCancel { page: usize, device: Option<String> },
    SelectionGrab { x: f64, y: f64 },
    SelectionDrag { x: f64, y: f64, alt: bool },
    SelectionRelease,
    SelectionCopy,
    SelectionCleared,
    Scroll { dx: f64, dy: f64 },
    ZoomStart { x: f64, y: f64 },
    ZoomChange { zoom: f64, dx: f64, dy: f64 },
    ZoomEnd,
    Undo,
    ToolChanged { tool: ToolType },
    TouchScrolling { enabled: bool },
    Key { pressed: bool, keyval: u32 },
}

impl Callback {
    /// Page of a page callback.
    pub fn page(&self) -> Option<usize> {
        match self {
            Callback::ButtonPress { page, .. }
            | Callback::Motion { page, .. }
            | Callback::ButtonRelease { page, .. }
            | Callback::Tap { page, .. }
            | Callback::DoublePress { page, .. }
            | Callback::TriplePress { page, .. }
            | Callback::ButtonClick { page, .. }
            | Callback::SequenceCancel { page, .. } => Some(*page),
            _ => None,
        }
    }
}

fn write_position(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    page: usize,
    pos: &CallbackPosition,
) -> fmt::Result {
    write!(f, "page {page}: {name} ({:.1}, {:.1})", pos.x, pos.y)?;
    if let Some(pressure) = pos.pressure {
        write!(f, " pressure={pressure:.3}")?;
    }
    Ok(())
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::ButtonPress { page, pos } => write_position(f, "press", *page, pos),
            Callback::Motion { page, pos } => write_position(f, "motion", *page, pos),
            Callback::ButtonRelease { page, pos } => write_position(f, "release", *page, pos),
            Callback::Tap { page, pos } => write_position(f, "tap", *page, pos),
            Callback::DoublePress { page, pos } => write_position(f, "double press", *page, pos),
            Callback::TriplePress { page, pos } => write_position(f, "triple press", *page, pos),
            Callback::ButtonClick { page, pos } => write_position(f, "click", *page, pos),
            Callback::SequenceCancel { page, device } => match device {
                Some(device) if !device.is_empty() => {
                    write!(f, "page {page}: cancel sequence of \"{device}\"")
                }
                _ => write!(f, "page {page}: cancel sequence"),
            },
            Callback::SelectionGrab { x, y } => write!(f, "selection: grab ({x:.1}, {y:.1})"),
            Callback::SelectionDrag { x, y, alt } => {
                write!(f, "selection: drag ({x:.1}, {y:.1})")?;
                if *alt {
                    write!(f, " +alt")?;
                }
                Ok(())
            }
            Callback::SelectionRelease => write!(f, "selection: release"),
            Callback::SelectionCopy => write!(f, "selection: copy"),
            Callback::SelectionCleared => write!(f, "selection: cleared"),
            Callback::Scroll { dx, dy } => write!(f, "view: scroll ({dx:.1}, {dy:.1})"),
            Callback::ZoomStart { x, y } => write!(f, "view: zoom start at ({x:.1}, {y:.1})"),
            Callback::ZoomChange { zoom, dx, dy } => {
                write!(f, "view: zoom {zoom:.3} scroll ({dx:.1}, {dy:.1})")
            }
            Callback::ZoomEnd => write!(f, "view: zoom end"),
            Callback::Undo => write!(f, "undo"),
            Callback::ToolChanged { tool } => write!(f, "tool: {tool:?}"),
            Callback::TouchScrolling { enabled } => write!(f, "view: kinetic scrolling {enabled}"),
            Callback::Key { pressed, keyval } => {
                let action = if *pressed { "press" } else { "release" };
                write!(f, "key: {action} {keyval:#x}")
            }
        }
    }
}

/// Selection state of a [`RecordingHost`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedSelection {
    pub page: PageIndex,
    /// Page-relative bounds
    pub bounds: Rect,
    pub moving: bool,
}

/// Host that records callbacks instead of drawing.
///
/// Pages are laid out by the caller. Tool switching follows the usual
/// toolbar-plus-temporary-button-tool model.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    pub pages: Vec<Rect>,
    pub callbacks: Vec<Callback>,
    pub toolbar_tool: ToolType,
    pub active_tool: ToolType,
    pub drawing_type: DrawingType,
    pub selection: Option<RecordedSelection>,
    pub scroll: Vec2,
    pub viewport: (f64, f64),
    pub zoom_fit: bool,
    pub undo_depth: usize,
    pub touchscreen_scrolling: bool,
}

impl RecordingHost {
    pub fn new(pages: Vec<Rect>) -> Self {
        Self {
            pages,
            callbacks: Vec::new(),
            toolbar_tool: ToolType::Pen,
            active_tool: ToolType::Pen,
            drawing_type: DrawingType::Default,
            selection: None,
            scroll: Vec2::ZERO,
            viewport: (10_000.0, 10_000.0),
            zoom_fit: false,
            undo_depth: 0,
            touchscreen_scrolling: false,
        }
    }

    /// Pages of equal size stacked vertically with a gap between them.
    pub fn stacked(count: usize, width: f64, height: f64, gap: f64) -> Self {
        let pages = (0..count)
            .map(|i| {
                let y = i as f64 * (height + gap);
                Rect::new(0.0, y, width, y + height)
            })
            .collect();
        Self::new(pages)
    }

    pub fn with_tool(mut self, tool: ToolType) -> Self {
        self.toolbar_tool = tool;
        self.active_tool = tool;
        self
    }

    /// Removes and returns everything recorded so far.
    pub fn take_callbacks(&mut self) -> Vec<Callback> {
        std::mem::take(&mut self.callbacks)
    }

    fn record_page(
        &mut self,
        make: fn(usize, CallbackPosition) -> Callback,
        page: PageIndex,
        pos: &PositionInputData,
    ) -> bool {
        self.callbacks.push(make(page.0, pos.into()));
        true
    }
}

impl Canvas for RecordingHost {
    fn page_at(&self, position: Point) -> Option<PageIndex> {
        self.pages
            .iter()
            .position(|page| page.contains(position))
            .map(PageIndex)
    }

    fn page_bounds(&self, page: PageIndex) -> Rect {
        self.pages.get(page.0).copied().unwrap_or(Rect::ZERO)
    }

    fn on_button_press(&mut self, page: PageIndex, pos: &PositionInputData) -> bool {
        self.record_page(|page, pos| Callback::ButtonPress { page, pos }, page, pos)
    }

    fn on_motion(&mut self, page: PageIndex, pos: &PositionInputData) -> bool {
        self.record_page(|page, pos| Callback::Motion { page, pos }, page, pos)
    }

    fn on_button_release(&mut self, page: PageIndex, pos: &PositionInputData) -> bool {
        self.record_page(|page, pos| Callback::ButtonRelease { page, pos }, page, pos)
    }

    fn on_tap(&mut self, page: PageIndex, pos: &PositionInputData) -> bool {
        self.record_page(|page, pos| Callback::Tap { page, pos }, page, pos)
    }

    fn on_double_press(&mut self, page: PageIndex, pos: &PositionInputData) -> bool {
        self.record_page(|page, pos| Callback::DoublePress { page, pos }, page, pos)
    }

    fn on_triple_press(&mut self, page: PageIndex, pos: &PositionInputData) -> bool {
        self.record_page(|page, pos| Callback::TriplePress { page, pos }, page, pos)
    }

    fn on_button_click(&mut self, page: PageIndex, pos: &PositionInputData) -> bool {
        self.record_page(|page, pos| Callback::ButtonClick { page, pos }, page, pos)
    }

    fn on_sequence_cancel(&mut self, page: PageIndex, device: Option<&str>) {
        self.callbacks.push(Callback::SequenceCancel {
            page: page.0,
            device: device.map(str::to_string),
        });
    }

    fn selection_page(&self) -> Option<PageIndex> {
        self.selection.map(|selection| selection.page)
    }

    fn selection_grip_at(&self, x: f64, y: f64) -> Option<SelectionGrip> {
        let selection = self.selection?;
        selection
            .bounds
            .contains(Point::new(x, y))
            .then_some(SelectionGrip::Move)
    }

    fn selection_grab(&mut self, _grip: SelectionGrip, x: f64, y: f64) {
        if let Some(selection) = self.selection.as_mut() {
            selection.moving = true;
        }
        self.callbacks.push(Callback::SelectionGrab { x, y });
    }

    fn selection_is_moving(&self) -> bool {
        self.selection.is_some_and(|selection| selection.moving)
    }

    fn selection_drag(&mut self, x: f64, y: f64, alt: bool) {
        self.callbacks.push(Callback::SelectionDrag { x, y, alt });
    }

    fn selection_release(&mut self) {
        if let Some(selection) = self.selection.as_mut() {
            selection.moving = false;
        }
        self.callbacks.push(Callback::SelectionRelease);
    }

    fn selection_copy(&mut self) {
        self.callbacks.push(Callback::SelectionCopy);
    }

    fn clear_selection(&mut self) {
        self.selection = None;
        self.callbacks.push(Callback::SelectionCleared);
    }

    fn scroll_relative(&mut self, dx: f64, dy: f64) {
        self.scroll += Vec2::new(dx, dy);
        self.callbacks.push(Callback::Scroll { dx, dy });
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn viewport_size(&self) -> (f64, f64) {
        self.viewport
    }

    fn set_touchscreen_scrolling(&mut self, enabled: bool) {
        if self.touchscreen_scrolling != enabled {
            self.touchscreen_scrolling = enabled;
            self.callbacks.push(Callback::TouchScrolling { enabled });
        }
    }

    fn focus(&mut self) {}

    fn on_key(&mut self, pressed: bool, keyval: u32) -> bool {
        self.callbacks.push(Callback::Key { pressed, keyval });
        true
    }
}

impl ToolHandler for RecordingHost {
    fn tool_type(&self) -> ToolType {
        self.active_tool
    }

    fn toolbar_tool_type(&self) -> ToolType {
        self.toolbar_tool
    }

    fn drawing_type(&self) -> DrawingType {
        self.drawing_type
    }

    fn activate_button_tool(&mut self, tool: ToolType) -> bool {
        let changed = self.active_tool != tool;
        self.active_tool = tool;
        changed
    }

    fn restore_toolbar_tool(&mut self) -> bool {
        self.activate_button_tool(self.toolbar_tool)
    }

    fn select_tool(&mut self, tool: ToolType) {
        self.toolbar_tool = tool;
        self.active_tool = tool;
    }

    fn fire_tool_changed(&mut self) {
        self.callbacks.push(Callback::ToolChanged {
            tool: self.active_tool,
        });
    }
}

impl ZoomControl for RecordingHost {
    fn start_zoom_sequence(&mut self, center: Point) {
        self.callbacks.push(Callback::ZoomStart {
            x: center.x,
            y: center.y,
        });
    }

    fn zoom_sequence_change(&mut self, zoom: f64, _relative: bool, scroll: Option<Vec2>) {
        let scroll = scroll.unwrap_or(Vec2::ZERO);
        self.callbacks.push(Callback::ZoomChange {
            zoom,
            dx: scroll.x,
            dy: scroll.y,
        });
    }

    fn end_zoom_sequence(&mut self) {
        self.callbacks.push(Callback::ZoomEnd);
    }

    fn is_zoom_fit_mode(&self) -> bool {
        self.zoom_fit
    }

    fn set_zoom_fit_mode(&mut self, enabled: bool) {
        self.zoom_fit = enabled;
    }
}

impl UndoControl for RecordingHost {
    fn can_undo(&self) -> bool {
        self.undo_depth > 0
    }

    fn undo(&mut self) {
        self.undo_depth = self.undo_depth.saturating_sub(1);
        self.callbacks.push(Callback::Undo);
    }
}

/// A recorded session: page layout, initial tool and raw events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Canvas-local page rectangles as `[x0, y0, x1, y1]`
    pub pages: Vec<[f64; 4]>,
    #[serde(default = "default_trace_tool")]
    pub tool: ToolType,
    #[serde(default)]
    pub viewport: Option<(f64, f64)>,
    /// Undo steps available to the two-finger tap
    #[serde(default)]
    pub undo_depth: usize,
    pub events: Vec<RawInputEvent>,
}

fn default_trace_tool() -> ToolType {
    ToolType::Pen
}

impl Trace {
    pub fn from_json(path: &Path, json: &str) -> Result<Self, TraceError> {
        let trace: Trace = serde_json::from_str(json).map_err(|source| TraceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if trace.pages.is_empty() {
            return Err(TraceError::NoPages);
        }
        Ok(trace)
    }

    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let json = fs::read_to_string(path).map_err(|source| TraceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let trace = Self::from_json(path, &json)?;
        info!(
            "Loaded trace {} ({} pages, {} events)",
            path.display(),
            trace.pages.len(),
            trace.events.len()
        );
        Ok(trace)
    }

    /// Builds the host the trace was recorded against.
    pub fn host(&self) -> RecordingHost {
        let pages = self
            .pages
            .iter()
            .map(|[x0, y0, x1, y1]| Rect::new(*x0, *y0, *x1, *y1))
            .collect();
        let mut host = RecordingHost::new(pages).with_tool(self.tool);
        if let Some(viewport) = self.viewport {
            host.viewport = viewport;
        }
        host.undo_depth = self.undo_depth;
        host
    }
}

/// Replays a trace and returns the recorded callbacks.
///
/// Event timestamps drive the clock, so timers fire exactly as they would
/// have during recording. Palm rejection never touches the real touchscreen.
pub fn run(trace: &Trace, config: Config) -> Vec<Callback> {
    let hand = HandRecognition::with_mechanism(&config.hand_recognition, None);
    let mut context = InputContext::with_hand_recognition(trace.host(), config, hand);
    let start = Instant::now();

    for raw in &trace.events {
        let now = start + Duration::from_millis(u64::from(raw.time));
        while let Some(deadline) = context.next_deadline().filter(|deadline| *deadline <= now) {
            context.tick(deadline);
        }
        let consumed = context.handle_raw_at(raw, now);
        debug!("{:?} {:?} consumed={}", raw.source, raw.kind, consumed);
    }

    context.into_host().callbacks
}
