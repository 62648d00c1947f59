//! Hand-rolled flag parsing: `--gpu-backend=`, `--size=WxH`, `--width=`,
//! `--height=` and, for the viewer, one positional model path.

use std::path::PathBuf;

use platform::WindowConfig;
use wgpu::Backends;

/// Model loaded by the viewer when no path is given.
pub const DEFAULT_MODEL: &str = "hand.OBJ";

/// Everything the demos read from the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct CliArgs {
    pub width: u32,
    pub height: u32,
    pub backends: Backends,
    /// First argument that isn't a `--flag`.
    pub model: Option<PathBuf>,
}

impl Default for CliArgs {
    fn default() -> Self {
        let window = WindowConfig::default();
        Self {
            width: window.width,
            height: window.height,
            backends: window.backends,
            model: None,
        }
    }
}

impl CliArgs {
    /// `std::env::args()` minus the program name.
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Later flags override earlier ones; bad values keep the previous setting.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        args.into_iter().fold(Self::default(), |mut cli, arg| {
            cli.apply(&arg);
            cli
        })
    }

    fn apply(&mut self, arg: &str) {
        let Some(flag) = arg.strip_prefix("--") else {
            if self.model.is_none() {
                self.model = Some(PathBuf::from(arg));
            } else {
                log::warn!("Ignoring extra argument '{arg}'");
            }
            return;
        };

        let (name, value) = flag.split_once('=').unwrap_or((flag, ""));
        match name {
            "gpu-backend" => match backend_from_name(value) {
                Some(backends) => self.backends = backends,
                None => {
                    log::warn!("Unknown backend '{value}', falling back to auto.");
                    self.backends = Backends::all();
                }
            },
            "size" => match parse_dimensions(value) {
                Some((w, h)) => (self.width, self.height) = (w, h),
                None => log::warn!("Ignoring malformed --size='{value}'"),
            },
            "width" => set_extent(&mut self.width, name, value),
            "height" => set_extent(&mut self.height, name, value),
            _ => log::warn!("Ignoring unknown flag '{arg}'"),
        }
    }

    /// Model path for the viewer, or [`DEFAULT_MODEL`].
    pub fn model_path(&self) -> PathBuf {
        self.model
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL))
    }

    pub fn window_config(&self, title: &str) -> WindowConfig {
        WindowConfig {
            title: title.to_owned(),
            width: self.width,
            height: self.height,
            backends: self.backends,
        }
    }
}

fn backend_from_name(name: &str) -> Option<Backends> {
    match name.to_ascii_lowercase().as_str() {
        "auto" => Some(Backends::all()),
        "vulkan" | "vk" => Some(Backends::VULKAN),
        "dx12" | "d3d12" => Some(Backends::DX12),
        "metal" | "mtl" => Some(Backends::METAL),
        "gl" | "opengl" | "gles" => Some(Backends::GL),
        _ => None,
    }
}

/// `WxH` (either case of `x`); zero is bumped to 1.
fn parse_dimensions(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    Some((w.parse::<u32>().ok()?.max(1), h.parse::<u32>().ok()?.max(1)))
}

fn set_extent(slot: &mut u32, name: &str, value: &str) {
    match value.parse::<u32>() {
        Ok(v) => *slot = v.max(1),
        Err(_) => log::warn!("Ignoring malformed --{name}='{value}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> CliArgs {
        CliArgs::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_flags() {
        let cli = parse(&[]);
        let cfg = cli.window_config("t");
        assert_eq!((cfg.width, cfg.height), (800, 600));
        assert_eq!(cfg.backends, Backends::all());
        assert_eq!(cli.model_path(), PathBuf::from(DEFAULT_MODEL));
    }

    #[test]
    fn size_and_backend_flags() {
        let cli = parse(&["--size=1024X768", "--gpu-backend=VK"]);
        assert_eq!((cli.width, cli.height), (1024, 768));
        assert_eq!(cli.backends, Backends::VULKAN);

        let cli = parse(&["--width=0", "--height=50"]);
        assert_eq!((cli.width, cli.height), (1, 50));
    }

    #[test]
    fn bad_values_fall_back() {
        let cli = parse(&["--size=big", "--width=wide", "--gpu-backend=glide"]);
        assert_eq!(cli, CliArgs::default());

        // an unknown backend resets an earlier valid one
        let cli = parse(&["--gpu-backend=metal", "--gpu-backend=glide"]);
        assert_eq!(cli.backends, Backends::all());
    }

    #[test]
    fn later_flags_win() {
        let cli = parse(&["--size=640x480", "--height=200"]);
        assert_eq!((cli.width, cli.height), (640, 200));
    }

    #[test]
    fn model_path_skips_flags() {
        let cli = parse(&["--size=640x480", "models/hand.obj", "other.obj"]);
        assert_eq!(cli.model_path(), PathBuf::from("models/hand.obj"));
    }
}
