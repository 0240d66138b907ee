/// The shared default target every layer composites into.
pub const DEFAULT_TARGET: &str = "_rt_default";
/// Reserved texture name for "whatever the default target holds right now".
pub const FULL_FRAME_BUFFER: &str = "_rt_FullFrameBuffer";
/// Reserved texture name for a mip-mapped copy of the frame.
pub const MIP_MAPPED_FRAME_BUFFER: &str = "_rt_MipMappedFrameBuffer";
/// Prefix of the reserved "composited layer N" texture names.
pub const LAYER_COMPOSITE_PREFIX: &str = "_rt_imageLayerComposite_";
/// Prefix of resolved layer links, followed by the object id.
pub const LINK_PREFIX: &str = "_rt_link_";

/// Width and height of a render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSize {
    /// Fixed pixel size.
    Absolute {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Output surface size multiplied by `scale`, re-derived on resize.
    ScreenRelative {
        /// Factor applied to both surface dimensions.
        scale: f32,
    },
}

impl TargetSize {
    /// Pixel size for a given surface size, never below 1x1.
    pub fn resolve(&self, surface: (u32, u32)) -> (u32, u32) {
        match *self {
            Self::Absolute { width, height } => (width.max(1), height.max(1)),
            Self::ScreenRelative { scale } => (
                ((surface.0 as f32 * scale).round() as u32).max(1),
                ((surface.1 as f32 * scale).round() as u32).max(1),
            ),
        }
    }
}

/// Declaration of a named render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargetDesc {
    /// Size rule.
    pub size: TargetSize,
    /// May share backing storage with other reusable targets.
    pub allow_reuse: bool,
    /// Sized from the output surface.
    pub bind_screen: bool,
}

impl RenderTargetDesc {
    /// A fixed-size target.
    pub fn absolute(width: u32, height: u32) -> Self {
        Self {
            size: TargetSize::Absolute { width, height },
            allow_reuse: false,
            bind_screen: false,
        }
    }

    /// A screen-bound target scaled from the surface size.
    pub fn screen(scale: f32) -> Self {
        Self {
            size: TargetSize::ScreenRelative { scale },
            allow_reuse: false,
            bind_screen: true,
        }
    }

    /// Mark the target reusable.
    #[must_use]
    pub fn with_reuse(mut self, allow_reuse: bool) -> Self {
        self.allow_reuse = allow_reuse;
        self
    }
}

/// A reserved texture name found in a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedName {
    /// [`FULL_FRAME_BUFFER`].
    FullFrameBuffer,
    /// [`MIP_MAPPED_FRAME_BUFFER`].
    MipMappedFrameBuffer,
    /// [`LAYER_COMPOSITE_PREFIX`] followed by an object id.
    LayerComposite(i32),
}

impl ReservedName {
    /// Recognizes a reserved texture name.
    ///
    /// For layer composites the first run of digits after the prefix is
    /// the object id; a missing id yields `-1`.
    pub fn parse(name: &str) -> Option<Self> {
        if name == FULL_FRAME_BUFFER {
            return Some(Self::FullFrameBuffer);
        }
        if name == MIP_MAPPED_FRAME_BUFFER {
            return Some(Self::MipMappedFrameBuffer);
        }
        let start = name.find(LAYER_COMPOSITE_PREFIX)? + LAYER_COMPOSITE_PREFIX.len();
        let digits: String = name[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        Some(Self::LayerComposite(digits.parse().unwrap_or(-1)))
    }
}

/// Name a layer link resolves through, e.g. `_rt_link_12`.
pub fn link_target_name(object_id: i32) -> String {
    format!("{LINK_PREFIX}{object_id}")
}
