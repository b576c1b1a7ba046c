use crate::config::Config;
use crate::error::Result;
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::Path;

/// Extensions offered by the background picker.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// User-chosen picture, kept at source resolution and rescaled to the window.
pub struct BackgroundImage {
    source: RgbaImage,
    scaled: RgbaImage,
    /// Bumped whenever `scaled` changes so the painter knows to re-upload.
    generation: u64,
}

impl BackgroundImage {
    pub fn open(path: &Path, size: [u32; 2]) -> Result<Self> {
        let source = image::open(path)?.to_rgba8();
        Ok(Self::from_rgba(source, size))
    }

    pub fn from_rgba(source: RgbaImage, size: [u32; 2]) -> Self {
        let scaled = scale_to(&source, size);
        Self { source, scaled, generation: 0 }
    }

    /// Stretch to `size`, ignoring aspect ratio. No-op when already that size.
    pub fn rescale(&mut self, size: [u32; 2]) {
        if self.scaled.dimensions() == (size[0].max(1), size[1].max(1)) { return; }
        self.scaled = scale_to(&self.source, size);
        self.generation += 1;
    }

    pub fn scaled(&self) -> &RgbaImage { &self.scaled }

    pub fn generation(&self) -> u64 { self.generation }
}

fn scale_to(src: &RgbaImage, size: [u32; 2]) -> RgbaImage {
    image::imageops::resize(src, size[0].max(1), size[1].max(1), FilterType::Triangle)
}

/// What fills the rounded backdrop: the picture takes precedence over the color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintSource {
    Image { alpha: u8 },
    Color([u8; 4]),
}

pub struct BackgroundStyle {
    image: Option<BackgroundImage>,
    /// Unmultiplied RGBA.
    color: [u8; 4],
    image_alpha: u8,
}

impl BackgroundStyle {
    pub fn new(cfg: &Config) -> Self {
        Self { image: None, color: cfg.initial_color, image_alpha: cfg.default_image_alpha }
    }

    pub fn source(&self) -> PaintSource {
        match self.image {
            Some(_) => PaintSource::Image { alpha: self.image_alpha },
            None => PaintSource::Color(self.color),
        }
    }

    pub fn image(&self) -> Option<&BackgroundImage> { self.image.as_ref() }

    pub fn image_mut(&mut self) -> Option<&mut BackgroundImage> { self.image.as_mut() }

    pub fn color(&self) -> [u8; 4] { self.color }

    pub fn image_alpha(&self) -> u8 { self.image_alpha }

    /// A freshly picked picture resets both opacities.
    pub fn set_image(&mut self, img: BackgroundImage, cfg: &Config) {
        self.image = Some(img);
        self.image_alpha = cfg.default_image_alpha;
        self.color = cfg.reset_color;
    }

    pub fn clear(&mut self, cfg: &Config) {
        self.image = None;
        self.color = cfg.reset_color;
    }

    /// One wheel notch: up is more opaque, down more transparent. Zero delta does nothing.
    pub fn scroll(&mut self, delta_y: f32, cfg: &Config) {
        if delta_y == 0.0 { return; }
        let up = delta_y > 0.0;
        if self.image.is_some() {
            self.image_alpha = step_alpha(self.image_alpha, up, cfg.alpha_step, *cfg.image_alpha.start(), *cfg.image_alpha.end());
        } else {
            self.color[3] = step_alpha(self.color[3], up, cfg.alpha_step, *cfg.color_alpha.start(), *cfg.color_alpha.end());
        }
    }
}

fn step_alpha(current: u8, up: bool, step: u8, min: u8, max: u8) -> u8 {
    let next = if up { current.saturating_add(step) } else { current.saturating_sub(step) };
    next.clamp(min, max)
}

/// Half the height, capped.
pub fn corner_radius(height: f32, cap: f32) -> f32 { (height / 2.0).floor().min(cap) }

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn picture() -> BackgroundImage {
        BackgroundImage::from_rgba(RgbaImage::from_pixel(8, 4, Rgba([200, 10, 10, 255])), [450, 50])
    }

    #[test]
    fn starts_with_translucent_color() {
        let cfg = Config::default();
        let bg = BackgroundStyle::new(&cfg);
        assert_eq!(bg.source(), PaintSource::Color([20, 20, 20, 160]));
    }

    #[test]
    fn image_takes_precedence_and_resets_alphas() {
        let cfg = Config::default();
        let mut bg = BackgroundStyle::new(&cfg);
        bg.scroll(-120.0, &cfg);
        bg.set_image(picture(), &cfg);
        assert_eq!(bg.source(), PaintSource::Image { alpha: 230 });
        assert_eq!(bg.color(), [20, 20, 20, 230]);
        bg.clear(&cfg);
        assert_eq!(bg.source(), PaintSource::Color([20, 20, 20, 230]));
    }

    #[test]
    fn color_alpha_clamps_to_byte_range() {
        let cfg = Config::default();
        let mut bg = BackgroundStyle::new(&cfg);
        for _ in 0..40 { bg.scroll(120.0, &cfg); }
        assert_eq!(bg.color()[3], 255);
        for _ in 0..40 { bg.scroll(-1.0, &cfg); }
        assert_eq!(bg.color()[3], 0);
        bg.scroll(15.0, &cfg);
        assert_eq!(bg.color()[3], 15);
    }

    #[test]
    fn image_alpha_never_drops_below_thirty() {
        let cfg = Config::default();
        let mut bg = BackgroundStyle::new(&cfg);
        bg.set_image(picture(), &cfg);
        for _ in 0..40 { bg.scroll(-120.0, &cfg); }
        assert_eq!(bg.image_alpha(), 30);
        bg.scroll(120.0, &cfg);
        assert_eq!(bg.image_alpha(), 45);
        for _ in 0..40 { bg.scroll(120.0, &cfg); }
        assert_eq!(bg.image_alpha(), 255);
        // color untouched while the image is active
        assert_eq!(bg.color()[3], 230);
    }

    #[test]
    fn rescale_tracks_window_size() {
        let mut img = picture();
        assert_eq!(img.scaled().dimensions(), (450, 50));
        img.rescale([450, 50]);
        assert_eq!(img.generation(), 0);
        img.rescale([450, 150]);
        assert_eq!(img.scaled().dimensions(), (450, 150));
        assert_eq!(img.generation(), 1);
    }

    #[test]
    fn radius_is_half_height_capped() {
        assert_eq!(corner_radius(50.0, 25.0), 25.0);
        assert_eq!(corner_radius(30.0, 25.0), 15.0);
        assert_eq!(corner_radius(150.0, 25.0), 25.0);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        assert!(BackgroundImage::open(Path::new("/nonexistent/bg.png"), [10, 10]).is_err());
    }
}
