use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Instant;

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

use crate::audio_engine::ToneSynth;
use crate::config::SimulatorConfig;
use crate::export::save_png;
use crate::raster::FieldRaster;
use crate::scheduler::TARGET_FPS_RANGE;
use crate::session::Session;
use crate::types::{
    FieldModel, Shape, AMPLITUDE_RANGE, DAMPING_RANGE, FLUID_DEPTH_RANGE, MODE_INDEX_MAX,
    PARTICLE_RADIUS_RANGE,
};

const PARTICLE_COUNT_RANGE: RangeInclusive<usize> = 1_000..=60_000;

pub struct CymaticApp {
    session: Session,
    raster: FieldRaster,
    texture: Option<TextureHandle>,
    tone: Option<ToneSynth>,
    audio_error: Option<String>,
    tone_held: bool,
    export_path: PathBuf,
    status: Option<String>,
    particle_count: usize,
    fps_limit: f32,
    dirty: bool,
}

impl CymaticApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: SimulatorConfig) -> Self {
        let session = Session::new(&config);
        let raster = FieldRaster::new(config.raster_size, config.raster_size);

        let (tone, audio_error) = match ToneSynth::new() {
            Ok(synth) => (Some(synth), None),
            Err(err) => {
                log::warn!("audio unavailable: {err}");
                (None, Some(err.to_string()))
            }
        };

        Self {
            particle_count: session.particle_count(),
            fps_limit: session.target_fps().unwrap_or(60.0),
            session,
            raster,
            texture: None,
            tone,
            audio_error,
            tone_held: false,
            export_path: config.export_path,
            status: None,
            dirty: true,
        }
    }

    fn render_frame(&mut self) -> bool {
        if let Some(frame) = self.session.tick_at(Instant::now()) {
            self.raster.render(&frame.snapshot, self.session.particles());
            return true;
        }
        if self.dirty || self.texture.is_none() {
            let snapshot = self.session.snapshot();
            self.raster.render(&snapshot, self.session.particles());
            return true;
        }
        false
    }

    fn update_texture(&mut self, ctx: &egui::Context) {
        let image =
            ColorImage::from_rgba_unmultiplied(self.raster.dimensions(), self.raster.pixels());

        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture("cymatic-field", image, TextureOptions::LINEAR));
        }
    }

    fn export_if_requested(&mut self) {
        if !self.session.take_export_request() {
            return;
        }
        self.status = Some(match save_png(&self.export_path, &self.raster) {
            Ok(()) => format!("Saved {}", self.export_path.display()),
            Err(err) => {
                log::warn!("export failed: {err}");
                format!("Export failed: {err}")
            }
        });
    }

    fn sync_tone(&mut self) {
        let Some(tone) = &self.tone else {
            return;
        };
        if self.tone_held {
            tone.start_tone(self.session.tone_frequency());
        } else {
            tone.stop_tone();
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        let mut params = self.session.params();
        let mut changed = false;

        ui.heading("Plate");

        let mut model = params.model;
        egui::ComboBox::from_label("model")
            .selected_text(model.label())
            .show_ui(ui, |ui| {
                for option in FieldModel::ALL {
                    ui.selectable_value(&mut model, option, option.label());
                }
            });
        if model != params.model {
            self.session.set_model(model);
            params = self.session.params();
            changed = true;
        }

        let mut shape = params.shape;
        egui::ComboBox::from_label("pattern mode")
            .selected_text(shape.label())
            .show_ui(ui, |ui| {
                for option in Shape::ALL {
                    ui.selectable_value(&mut shape, option, option.label());
                }
            });
        if shape != params.shape {
            self.session.set_shape(shape);
            changed = true;
        }

        if params.model == FieldModel::TwoMode {
            let mut mode = params.mode_index;
            if ui
                .add(egui::Slider::new(&mut mode, 0..=MODE_INDEX_MAX).text("mode pair"))
                .changed()
            {
                self.session.set_mode_index(mode);
                changed = true;
            }
        }

        ui.separator();
        ui.label(format!("Frequency: {}", format_frequency(params.frequency)));
        if stepped_slider(
            ui,
            &mut params.frequency,
            params.model.frequency_range(),
            params.model.frequency_step(),
            "Hz",
            true,
        ) {
            self.session.set_frequency(params.frequency);
            changed = true;
        }

        if stepped_slider(ui, &mut params.amplitude, AMPLITUDE_RANGE, 0.01, "amplitude", false) {
            self.session.set_amplitude(params.amplitude);
            changed = true;
        }

        if params.model == FieldModel::ReflectingWave {
            if stepped_slider(
                ui,
                &mut params.fluid_depth,
                FLUID_DEPTH_RANGE,
                0.001,
                "fluid depth (m)",
                false,
            ) {
                self.session.set_fluid_depth(params.fluid_depth);
                changed = true;
            }

            if stepped_slider(ui, &mut params.damping, DAMPING_RANGE, 0.001, "damping", false) {
                self.session.set_damping(params.damping);
                changed = true;
            }
        }

        ui.separator();
        ui.heading("Particles");

        let mut enabled = self.session.particles_enabled();
        if ui.checkbox(&mut enabled, "show settling particles").changed() {
            self.session.set_particles_enabled(enabled);
            changed = true;
        }

        let count = ui.add(
            egui::Slider::new(&mut self.particle_count, PARTICLE_COUNT_RANGE).text("count"),
        );
        if count.drag_stopped() || (count.changed() && !count.dragged()) {
            self.session.set_particle_count(self.particle_count);
            changed = true;
        }

        if ui
            .add(
                egui::Slider::new(&mut params.particle_radius, PARTICLE_RADIUS_RANGE)
                    .text("particle size (px)"),
            )
            .changed()
        {
            self.session.set_particle_radius(params.particle_radius);
            changed = true;
        }

        ui.separator();
        ui.heading("Playback");

        let mut limited = self.session.target_fps().is_some();
        ui.horizontal(|ui| {
            let toggled = ui.checkbox(&mut limited, "limit FPS").changed();
            let moved = ui
                .add_enabled(limited, egui::Slider::new(&mut self.fps_limit, TARGET_FPS_RANGE))
                .changed();
            if toggled || moved {
                self.session.set_target_fps(limited.then_some(self.fps_limit));
            }
        });

        ui.horizontal(|ui| {
            let label = if self.session.is_running() {
                "Stop animation"
            } else {
                "Start animation"
            };
            if ui.button(label).clicked() {
                self.session.toggle();
            }

            if ui.button("Reseed particles").clicked() {
                self.session.reseed_particles();
                changed = true;
            }

            if ui.button("Export image").clicked() {
                self.session.request_export();
                changed = true;
            }
        });

        let play = ui.add_enabled(self.tone.is_some(), egui::Button::new("Play tone (hold)"));
        self.tone_held = play.is_pointer_button_down_on();

        if let Some(tone) = &self.tone {
            ui.label(format!("Audio device: {}", tone.device_name));
        } else if let Some(err) = &self.audio_error {
            ui.colored_label(
                egui::Color32::from_rgb(230, 100, 100),
                format!("Audio offline: {err}"),
            );
        }

        if let Some(status) = &self.status {
            ui.label(status);
        }

        ui.separator();
        ui.collapsing("About Chladni plates", |ui| {
            ui.label(
                "A plate driven at one of its resonant frequencies vibrates in a fixed \
                 standing-wave shape. Sand scattered on it is thrown off the moving regions \
                 and collects along the nodal lines, where the surface stays still.",
            );
            ui.label(
                "Move the frequency to morph the pattern, switch the outline to change \
                 which modes the plate supports, and hold the tone button to hear the drive.",
            );
        });

        if changed {
            self.dirty = true;
        }
    }

    fn draw_visuals(&mut self, ui: &mut egui::Ui) {
        let animation = self.session.animation();
        ui.horizontal(|ui| {
            ui.label(format!(
                "drive: {}",
                format_frequency(animation.interpolated_frequency())
            ));
            ui.separator();
            ui.label(format!("glide: {:.0}%", animation.transition_progress * 100.0));
            ui.separator();
            ui.label(format!("t = {:.2} s", animation.current_time));
            ui.separator();
            ui.label(format!("particles: {}", self.session.particles().len()));
        });

        ui.separator();

        if let Some(texture) = &self.texture {
            let image_size = texture.size_vec2();
            let available = ui.available_size();
            let scale = (available.x / image_size.x)
                .min(available.y / image_size.y)
                .clamp(0.5, 4.0);
            ui.image((texture.id(), image_size * scale));
        }
    }
}

impl eframe::App for CymaticApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.render_frame() {
            self.dirty = false;
            self.update_texture(ctx);
            self.export_if_requested();
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_controls(ui);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_visuals(ui);
        });

        self.sync_tone();
        ctx.request_repaint();
    }
}

fn stepped_slider(
    ui: &mut egui::Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    step: f32,
    text: &str,
    logarithmic: bool,
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        if ui.small_button("-").clicked() {
            *value = (*value - step).max(*range.start());
            changed = true;
        }
        changed |= ui
            .add(
                egui::Slider::new(value, range.clone())
                    .logarithmic(logarithmic)
                    .text(text),
            )
            .changed();
        if ui.small_button("+").clicked() {
            *value = (*value + step).min(*range.end());
            changed = true;
        }
    });
    changed
}

pub fn format_frequency(hz: f32) -> String {
    if hz >= 1_000_000.0 {
        format!("{:.2} MHz", hz / 1_000_000.0)
    } else if hz >= 1_000.0 {
        format!("{:.2} kHz", hz / 1_000.0)
    } else {
        format!("{hz:.2} Hz")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_labels_pick_unit() {
        assert_eq!(format_frequency(1_000_000.0), "1.00 MHz");
        assert_eq!(format_frequency(25_500.0), "25.50 kHz");
        assert_eq!(format_frequency(440.0), "440.00 Hz");
        assert_eq!(format_frequency(999.999), "1000.00 Hz");
    }
}
