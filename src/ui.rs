use crate::shell::LoadingIndicator;

/// Draw the loading indicator over the scene while a load is pending.
pub fn show_loading(ctx: &egui::Context, loading: Option<LoadingIndicator>) {
    let Some(indicator) = loading else { return };

    egui::Area::new(egui::Id::new("loading_indicator"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(220.0);
                ui.vertical_centered(|ui| match indicator.percent {
                    Some(percent) => {
                        ui.label(format!("{percent} % loaded"));
                        ui.add(egui::ProgressBar::new(percent as f32 / 100.0));
                    }
                    // total size unknown
                    None => {
                        ui.label("Loading...");
                        ui.spinner();
                    }
                });
            });
        });
}
