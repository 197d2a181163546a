use constants::binding_aliases::{
    ALPHA_ALIASES, AUDIO_BANDS_ALIASES, AUDIO_VOLUME_ALIASES, BRIGHTNESS_ALIASES,
    COLOR_MAP_ALIASES, DEPTH_MAP_ALIASES, DEPTH_OFFSET_ALIASES, DEPTH_RANGE_ALIASES,
    HUE_SHIFT_ALIASES, INVERSE_PROJECTION_ALIASES, INVERSE_VIEW_ALIASES, MAP_HEIGHT_ALIASES,
    MAP_WIDTH_ALIASES, NORMAL_MAP_ALIASES, POSITION_MAP_ALIASES, RAY_PARAMS_ALIASES,
    SPAWN_RATE_ALIASES, STENCIL_MAP_ALIASES, THROTTLE_ALIASES, VELOCITY_MAP_ALIASES,
};

/// Property type an effect instance declares for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Texture,
    Float,
    Vec2,
    Vec4,
    Mat4,
}

/// Groups of signals that modes switch on and off together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalFamily {
    Geometry,
    Mask,
    Colour,
    Motion,
    Camera,
    Audio,
    Parameter,
}

/// Logical value the pipeline can provide to an effect instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    DepthMap,
    StencilMap,
    PositionMap,
    ColorMap,
    VelocityMap,
    NormalMap,
    RayParams,
    InverseView,
    InverseProjection,
    DepthRange,
    Throttle,
    AudioVolume,
    AudioBands,
    HueShift,
    Brightness,
    Alpha,
    SpawnRate,
    DepthOffset,
    MapWidth,
    MapHeight,
}

impl Signal {
    pub const COUNT: usize = 20;

    pub const ALL: [Signal; Signal::COUNT] = [
        Signal::DepthMap,
        Signal::StencilMap,
        Signal::PositionMap,
        Signal::ColorMap,
        Signal::VelocityMap,
        Signal::NormalMap,
        Signal::RayParams,
        Signal::InverseView,
        Signal::InverseProjection,
        Signal::DepthRange,
        Signal::Throttle,
        Signal::AudioVolume,
        Signal::AudioBands,
        Signal::HueShift,
        Signal::Brightness,
        Signal::Alpha,
        Signal::SpawnRate,
        Signal::DepthOffset,
        Signal::MapWidth,
        Signal::MapHeight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> PropertyKind {
        match self {
            Signal::DepthMap
            | Signal::StencilMap
            | Signal::PositionMap
            | Signal::ColorMap
            | Signal::VelocityMap
            | Signal::NormalMap => PropertyKind::Texture,
            Signal::RayParams | Signal::AudioBands => PropertyKind::Vec4,
            Signal::InverseView | Signal::InverseProjection => PropertyKind::Mat4,
            Signal::DepthRange => PropertyKind::Vec2,
            Signal::Throttle
            | Signal::AudioVolume
            | Signal::HueShift
            | Signal::Brightness
            | Signal::Alpha
            | Signal::SpawnRate
            | Signal::DepthOffset
            | Signal::MapWidth
            | Signal::MapHeight => PropertyKind::Float,
        }
    }

    pub fn family(self) -> SignalFamily {
        match self {
            Signal::DepthMap | Signal::PositionMap | Signal::NormalMap => SignalFamily::Geometry,
            Signal::StencilMap => SignalFamily::Mask,
            Signal::ColorMap => SignalFamily::Colour,
            Signal::VelocityMap => SignalFamily::Motion,
            Signal::RayParams
            | Signal::InverseView
            | Signal::InverseProjection
            | Signal::DepthRange
            | Signal::MapWidth
            | Signal::MapHeight => SignalFamily::Camera,
            Signal::AudioVolume | Signal::AudioBands => SignalFamily::Audio,
            Signal::Throttle
            | Signal::HueShift
            | Signal::Brightness
            | Signal::Alpha
            | Signal::SpawnRate
            | Signal::DepthOffset => SignalFamily::Parameter,
        }
    }
}

/// Ordered candidate property names per signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: [&'static [&'static str]; Signal::COUNT],
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            aliases: [
                DEPTH_MAP_ALIASES,
                STENCIL_MAP_ALIASES,
                POSITION_MAP_ALIASES,
                COLOR_MAP_ALIASES,
                VELOCITY_MAP_ALIASES,
                NORMAL_MAP_ALIASES,
                RAY_PARAMS_ALIASES,
                INVERSE_VIEW_ALIASES,
                INVERSE_PROJECTION_ALIASES,
                DEPTH_RANGE_ALIASES,
                THROTTLE_ALIASES,
                AUDIO_VOLUME_ALIASES,
                AUDIO_BANDS_ALIASES,
                HUE_SHIFT_ALIASES,
                BRIGHTNESS_ALIASES,
                ALPHA_ALIASES,
                SPAWN_RATE_ALIASES,
                DEPTH_OFFSET_ALIASES,
                MAP_WIDTH_ALIASES,
                MAP_HEIGHT_ALIASES,
            ],
        }
    }
}

impl AliasTable {
    pub fn aliases(&self, signal: Signal) -> &'static [&'static str] {
        self.aliases[signal.index()]
    }

    /// Replaces the candidates for one signal, keeping priority order as given.
    pub fn with_aliases(mut self, signal: Signal, aliases: &'static [&'static str]) -> Self {
        self.aliases[signal.index()] = aliases;
        self
    }
}
