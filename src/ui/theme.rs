use crate::layout::Ink;
use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub function: Color,
    pub type_name: Color, // Cyan for type names
    pub scalar: Color,
    pub pointer: Color,
    pub parameter: Color,
    pub array: Color,
    pub heap_block: Color,
    pub object: Color,
    pub arrow: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for current line
    function: Color::Rgb(249, 226, 175),       // Yellow for scope names
    type_name: Color::Rgb(148, 226, 213),      // Cyan/teal for type names
    scalar: Color::Rgb(250, 179, 135),
    pointer: Color::Rgb(137, 220, 235),
    parameter: Color::Rgb(166, 227, 161),
    array: Color::Rgb(245, 224, 220),
    heap_block: Color::Rgb(166, 227, 161),
    object: Color::Rgb(180, 190, 254),
    arrow: Color::Rgb(137, 180, 250),
};

impl Theme {
    /// Canvas color for a draw-list role
    pub fn ink(&self, ink: Ink) -> Color {
        match ink {
            Ink::Divider | Ink::Muted => self.comment,
            Ink::SectionTitle => self.function,
            Ink::Scalar | Ink::Field => self.scalar,
            Ink::Pointer | Ink::PointerField => self.pointer,
            Ink::Parameter => self.parameter,
            Ink::Array => self.array,
            Ink::HeapBlock | Ink::HeapObject => self.heap_block,
            Ink::Object => self.object,
            Ink::Arrow => self.arrow,
            Ink::Label => self.fg,
        }
    }
}
