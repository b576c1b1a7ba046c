use crate::background::{corner_radius, BackgroundImage, BackgroundStyle, PaintSource, IMAGE_EXTENSIONS};
use crate::config::Config;
use crate::display::{DisplayState, DragState, MoveAnimation, PointerEvent, SizeTier, Transition, WindowGeometry};
use crate::error::Result;
use crate::poller::Poller;
use eframe::egui;
use egui::epaint::RectShape;
use egui::{pos2, Color32, FontFamily, FontId, Label, Pos2, Rect, RichText, Rounding, Sense, Stroke, TextStyle, TextureHandle, Vec2, ViewportCommand};
use std::time::Instant;

pub const TITLE: &str = "NotosIsland";

/// The overlay window: owns every piece of transient state and drives it from egui input.
pub struct App {
    cfg: Config,
    poller: Poller,
    last_tick: Instant,

    display: DisplayState,
    geometry: Option<WindowGeometry>,
    drag: Option<DragState>,
    animation: Option<MoveAnimation>,
    hovered: bool,

    background: BackgroundStyle,
    // uploaded copy of the scaled background, tagged with its generation
    texture: Option<(u64, TextureHandle)>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, cfg: Config) -> Self {
        let mut style: egui::Style = (*cc.egui_ctx.style()).clone();
        style.visuals.override_text_color = Some(Color32::WHITE);
        style.interaction.selectable_labels = false;
        style.text_styles = [
            (TextStyle::Heading,  FontId::new(cfg.font_size, FontFamily::Proportional)),
            (TextStyle::Body,     FontId::new(cfg.font_size, FontFamily::Proportional)),
            (TextStyle::Monospace,FontId::new(cfg.font_size, FontFamily::Monospace)),
            (TextStyle::Button,   FontId::new(cfg.font_size + 1.0, FontFamily::Proportional)),
            (TextStyle::Small,    FontId::new(cfg.font_size, FontFamily::Proportional)),
        ].into();
        cc.egui_ctx.set_style(style);

        let mut poller = Poller::system();
        poller.tick();

        Self {
            background: BackgroundStyle::new(&cfg),
            cfg,
            poller,
            last_tick: Instant::now(),
            display: DisplayState::default(),
            geometry: None,
            drag: None,
            animation: None,
            hovered: false,
            texture: None,
        }
    }

    fn screen_width(ctx: &egui::Context) -> Option<f32> {
        ctx.input(|i| i.viewport().monitor_size.map(|s| s.x))
    }

    fn window_origin(ctx: &egui::Context) -> Option<Pos2> {
        ctx.input(|i| i.viewport().inner_rect.or(i.viewport().outer_rect).map(|r| r.min))
    }

    /// Placement is decided on the first frame the monitor size is known.
    fn ensure_geometry(&mut self, ctx: &egui::Context) {
        if self.geometry.is_some() { return; }
        let geometry = match (Self::screen_width(ctx), Self::window_origin(ctx)) {
            (Some(w), _) => WindowGeometry::centered(w, &self.cfg),
            (None, Some(p)) => WindowGeometry { original: p, current: p, tier: SizeTier::Collapsed },
            (None, None) => return,
        };
        log::debug!("original position {:?}", geometry.original);
        ctx.send_viewport_cmd(ViewportCommand::OuterPosition(geometry.current));
        self.geometry = Some(geometry);
    }

    fn pixel_size(&self, ctx: &egui::Context, tier: SizeTier) -> [u32; 2] {
        let s = tier.size(&self.cfg) * ctx.pixels_per_point();
        [s.x.round() as u32, s.y.round() as u32]
    }

    fn apply(&mut self, ctx: &egui::Context, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Resize(tier) => {
                ctx.send_viewport_cmd(ViewportCommand::InnerSize(tier.size(&self.cfg)));
                let screen = Self::screen_width(ctx);
                if let Some(g) = self.geometry.as_mut() {
                    let pos = g.resize(tier, screen, &self.cfg);
                    if self.animation.is_none() { ctx.send_viewport_cmd(ViewportCommand::OuterPosition(pos)); }
                }
                let px = self.pixel_size(ctx, tier);
                if let Some(img) = self.background.image_mut() { img.rescale(px); }
            }
            Transition::ReturnToOrigin => {
                if let Some(g) = self.geometry.as_mut() {
                    let from = g.current;
                    g.current = g.original;
                    self.animation = Some(MoveAnimation::new(from, g.original, Instant::now(), self.cfg.return_animation));
                }
            }
        }
    }

    fn pointer_event(&mut self, ctx: &egui::Context, event: PointerEvent) {
        let at_origin = self.geometry.map(|g| g.at_origin()).unwrap_or(true);
        let t = self.display.handle(event, at_origin);
        log::trace!("{:?} -> {:?}", event, t);
        self.apply(ctx, t);
    }

    fn step_animation(&mut self, ctx: &egui::Context) {
        let Some(anim) = self.animation else { return };
        let now = Instant::now();
        ctx.send_viewport_cmd(ViewportCommand::OuterPosition(anim.position_at(now)));
        if anim.finished(now) { self.animation = None; } else { ctx.request_repaint(); }
    }

    // ===================== Pointer & drag =====================
    fn handle_window_input(&mut self, ctx: &egui::Context, resp: &egui::Response) {
        let hovered = ctx.input(|i| i.pointer.has_pointer());
        if hovered != self.hovered {
            self.hovered = hovered;
            self.pointer_event(ctx, if hovered { PointerEvent::Enter } else { PointerEvent::Leave });
        }

        if resp.double_clicked_by(egui::PointerButton::Primary) {
            self.pointer_event(ctx, PointerEvent::DoubleClick);
        }

        let Some(g) = self.geometry.as_mut() else { return };
        let origin = Self::window_origin(ctx).unwrap_or(g.current);
        if resp.drag_started_by(egui::PointerButton::Primary) {
            if let Some(press) = ctx.input(|i| i.pointer.press_origin()) {
                self.drag = Some(DragState::begin(origin + press.to_vec2(), g.current));
            }
        }
        if let (true, Some(drag)) = (resp.dragged_by(egui::PointerButton::Primary), self.drag) {
            if let Some(local) = ctx.input(|i| i.pointer.latest_pos()) {
                let next = drag.position_for(origin + local.to_vec2());
                if next != g.current {
                    g.current = next;
                    self.animation = None;
                    ctx.send_viewport_cmd(ViewportCommand::OuterPosition(next));
                }
            }
        }
        if resp.drag_stopped() {
            self.drag = None;
            g.settle(Self::window_origin(ctx));
        }
    }

    fn handle_scroll(&mut self, ctx: &egui::Context) {
        let dy = ctx.input(|i| i.raw_scroll_delta.y);
        if dy != 0.0 {
            self.background.scroll(dy, &self.cfg);
            ctx.request_repaint();
        }
    }

    // ===================== Background =====================
    fn change_background(&mut self, ctx: &egui::Context) -> Result<()> {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Choose background image")
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
        else { return Ok(()) };
        let img = BackgroundImage::open(&path, self.pixel_size(ctx, self.display.tier()))?;
        log::info!("background image {}", path.display());
        self.background.set_image(img, &self.cfg);
        self.texture = None;
        Ok(())
    }

    fn clear_background(&mut self) {
        self.background.clear(&self.cfg);
        self.texture = None;
    }

    fn background_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        let img = self.background.image()?;
        let fresh = matches!(&self.texture, Some((gen, _)) if *gen == img.generation());
        if !fresh {
            let scaled = img.scaled();
            let size = [scaled.width() as usize, scaled.height() as usize];
            let color = egui::ColorImage::from_rgba_unmultiplied(size, scaled.as_raw());
            self.texture = Some((img.generation(), ctx.load_texture("background", color, egui::TextureOptions::LINEAR)));
        }
        self.texture.as_ref().map(|(_, t)| t.id())
    }

    fn paint_backdrop(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: Rect) {
        let rounding = Rounding::same(corner_radius(rect.height(), self.cfg.corner_radius_cap));
        match self.background.source() {
            PaintSource::Image { alpha } => {
                if let Some(tex) = self.background_texture(ctx) {
                    let mut shape = RectShape::filled(rect, rounding, Color32::WHITE.gamma_multiply(alpha as f32 / 255.0));
                    shape.fill_texture_id = tex;
                    shape.uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                    painter.add(shape);
                }
            }
            PaintSource::Color([r, g, b, a]) => {
                painter.rect_filled(rect, rounding, Color32::from_rgba_unmultiplied(r, g, b, a));
            }
        }
        painter.rect_stroke(rect.shrink(0.5), rounding, Stroke::new(1.0, Color32::from_gray(self.cfg.border_gray)));
    }

    // ===================== Rows =====================
    fn label_row(ui: &mut egui::Ui, row: Rect, left: f32, right: f32, texts: &[String]) {
        let inner = Rect::from_min_max(pos2(row.min.x + left, row.min.y), pos2(row.max.x - right, row.max.y));
        let cell_w = inner.width() / texts.len() as f32;
        for (i, t) in texts.iter().enumerate() {
            let x = inner.min.x + cell_w * i as f32;
            let cell = Rect::from_min_size(pos2(x, inner.min.y), Vec2::new(cell_w, inner.height()));
            ui.put(cell, Label::new(RichText::new(t)).wrap_mode(egui::TextWrapMode::Extend));
        }
    }

    fn settings_row(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, row: Rect) {
        let size = Vec2::new(100.0, 30.0);
        let gap = 50.0;
        let total = size.x * 3.0 + gap * 2.0;
        let mut x = row.center().x - total / 2.0;
        let mut cell = || {
            let r = Rect::from_center_size(pos2(x + size.x / 2.0, row.center().y), size);
            x += size.x + gap;
            r
        };
        let fill = |rgb: [u8; 3]| Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], 230);
        let change = ui.put(cell(), egui::Button::new("Change background").fill(fill([45, 55, 72])).rounding(16.0));
        let clear = ui.put(cell(), egui::Button::new("Clear background").fill(fill([65, 45, 102])).rounding(16.0));
        let close = ui.put(cell(), egui::Button::new("Close").fill(fill([102, 45, 45])).rounding(16.0));

        if change.clicked() {
            if let Err(e) = self.change_background(ctx) { log::warn!("could not load background: {}", e); }
        }
        if clear.clicked() { self.clear_background(); }
        if close.clicked() {
            log::info!("closing");
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }
    }
}

impl eframe::App for App {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_geometry(ctx);

        if self.last_tick.elapsed() >= self.cfg.tick { self.poller.tick(); self.last_tick = Instant::now(); }
        ctx.request_repaint_after(self.cfg.tick.saturating_sub(self.last_tick.elapsed()));

        self.step_animation(ctx);
        self.handle_scroll(ctx);

        egui::CentralPanel::default().frame(egui::Frame::none()).show(ctx, |ui| {
            let rect = ui.max_rect();
            let painter = ui.painter().clone();
            self.paint_backdrop(ctx, &painter, rect);

            // added before the rows so buttons win the hit test
            let resp = ui.interact(rect, ui.id().with("window"), Sense::click_and_drag());
            self.handle_window_input(ctx, &resp);

            let row_h = self.cfg.collapsed_height;
            let row = |n: f32| Rect::from_min_size(pos2(rect.min.x, rect.min.y + row_h * n), Vec2::new(rect.width(), row_h));
            let r = self.poller.readings().clone();
            Self::label_row(ui, row(0.0), 15.0, 15.0, &[
                r.net,
                format!("CPU: {}", r.cpu),
                format!("GPU: {}", r.gpu),
                format!("RAM: {}", r.mem),
            ]);
            if self.display.expanded {
                Self::label_row(ui, row(1.0), 25.0, 15.0, &[
                    format!("DSK: {}", r.disk),
                    format!("CPU: {}", r.cpu_temp),
                    format!("GPU: {}", r.gpu_temp),
                ]);
            }
            if self.display.show_settings() {
                self.settings_row(ctx, ui, row(2.0));
            }
        });
    }
}
