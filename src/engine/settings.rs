/// Everything `Renderer::new` needs to open the window and set up the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSettings {
    /// Window title shown in the title bar.
    pub title: String,

    /// Initial inner size in physical pixels.
    pub width: u32,
    pub height: u32,

    /// Requested OpenGL version as (major, minor). A core profile is always requested.
    pub gl_version: (u8, u8),

    /// Sync buffer swaps to the display refresh.
    pub vsync: bool,

    /// RGBA color the framebuffer is cleared to each frame.
    pub clear_color: [f32; 4],
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "LearnOpenGL".to_owned(),
            width: 800,
            height: 600,
            gl_version: (3, 3),
            vsync: true,
            clear_color: [0.2, 0.3, 0.3, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tutorial_window() {
        let settings = WindowSettings::default();
        assert_eq!(settings.title, "LearnOpenGL");
        assert_eq!((settings.width, settings.height), (800, 600));
        assert_eq!(settings.gl_version, (3, 3));
        assert_eq!(settings.clear_color, [0.2, 0.3, 0.3, 1.0]);
    }
}
