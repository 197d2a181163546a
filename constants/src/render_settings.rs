use bevy::color::Color;

pub const STATUS_FONT_SIZE: f32 = 16.0;
pub const STATUS_TEXT_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);
pub const STATUS_MARGIN_PX: f32 = 12.0;
