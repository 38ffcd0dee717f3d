use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default = "EngineSettings::default_vsync")]
    pub vsync: bool,
    /// Frames per second cap; 0 disables the throttle.
    #[serde(default)]
    pub frame_limit: u32,
    #[serde(default = "EngineSettings::default_renderer")]
    pub renderer: String,
    #[serde(default)]
    pub shadows: ShadowSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            vsync: Self::default_vsync(),
            frame_limit: 0,
            renderer: Self::default_renderer(),
            shadows: ShadowSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {:?} ({}). Falling back to default engine settings.",
                    path, err
                );
                EngineSettings::default()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Engine settings file {:?} not found. Using default settings.",
                    path
                );
                EngineSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default engine settings.",
                    path, err
                );
                EngineSettings::default()
            }
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let settings = serde_json::from_str::<EngineSettings>(contents)?;
        info!("Loaded engine settings");
        Ok(settings.validate())
    }

    fn validate(mut self) -> Self {
        if self.window.width == 0 || self.window.height == 0 {
            warn!("Window size must be greater than zero. Using default size.");
            let defaults = WindowSettings::default();
            self.window.width = defaults.width;
            self.window.height = defaults.height;
        }

        if self.renderer.trim().is_empty() {
            warn!("Renderer name is empty. Using '{}'.", Self::default_renderer());
            self.renderer = Self::default_renderer();
        }

        let defaults = ShadowSettings::default();
        if self.shadows.directional == 0 {
            warn!("Directional shadow map size must be greater than zero. Using default value.");
            self.shadows.directional = defaults.directional;
        }
        if self.shadows.point == 0 {
            warn!("Point shadow map size must be greater than zero. Using default value.");
            self.shadows.point = defaults.point;
        }
        if self.shadows.spot == 0 {
            warn!("Spot shadow map size must be greater than zero. Using default value.");
            self.shadows.spot = defaults.spot;
        }

        self
    }

    const fn default_vsync() -> bool {
        true
    }

    fn default_renderer() -> String {
        "deferred".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    #[serde(default = "WindowSettings::default_title")]
    pub title: String,
    #[serde(default)]
    pub mode: WindowMode,
}

impl WindowSettings {
    fn default_title() -> String {
        "deferred engine".to_string()
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: Self::default_title(),
            mode: WindowMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    #[default]
    Windowed,
    FullScreen,
}

/// Shadow map resolutions per light source, in texels per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub directional: u32,
    pub point: u32,
    pub spot: u32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            directional: 3072,
            point: 512,
            spot: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_settings() -> EngineSettings {
        EngineSettings {
            window: WindowSettings {
                width: 0,
                height: 0,
                title: "broken".into(),
                mode: WindowMode::FullScreen,
            },
            vsync: false,
            frame_limit: 30,
            renderer: "  ".into(),
            shadows: ShadowSettings {
                directional: 0,
                point: 0,
                spot: 0,
            },
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();
        let defaults = EngineSettings::default();

        assert_eq!(validated.window.width, defaults.window.width);
        assert_eq!(validated.window.height, defaults.window.height);
        assert_eq!(validated.renderer, "deferred");
        assert_eq!(validated.shadows, ShadowSettings::default());
        assert_eq!(validated.frame_limit, 30);
        assert_eq!(validated.window.mode, WindowMode::FullScreen);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings =
            EngineSettings::from_json(r#"{ "frame_limit": 60, "shadows": { "directional": 2048, "point": 256, "spot": 512 } }"#)
                .unwrap();

        assert_eq!(settings.frame_limit, 60);
        assert!(settings.vsync);
        assert_eq!(settings.window.width, 800);
        assert_eq!(settings.shadows.directional, 2048);
        assert_eq!(settings.renderer, "deferred");
    }

    #[test]
    fn window_mode_uses_snake_case() {
        let settings = EngineSettings::from_json(
            r#"{ "window": { "width": 640, "height": 480, "mode": "full_screen" } }"#,
        )
        .unwrap();
        assert_eq!(settings.window.mode, WindowMode::FullScreen);
        assert_eq!(settings.window.title, "deferred engine");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = EngineSettings::load_from_path("definitely/not/here.json");
        assert_eq!(settings.shadows, ShadowSettings::default());
        assert_eq!(settings.frame_limit, 0);
    }
}
