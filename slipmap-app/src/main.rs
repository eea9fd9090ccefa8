use anyhow::Context as _;
use clap::Parser;
use slipmap::{prelude::*, ui::UiMapExt};
use std::{cell::Cell, path::PathBuf, rc::Rc};

/// Viewer for a directory of pre-rendered map tiles
#[derive(Parser, Debug)]
#[command(name = "slipmap-app", version, about)]
struct Cli {
    /// Tile directory containing `tile.info` and the level directories
    #[arg(value_hint = clap::ValueHint::DirPath)]
    tiles: PathBuf,

    /// Level to start at, defaults to the coarsest available
    #[arg(short, long)]
    level: Option<u8>,

    /// JSON map configuration; `tiles` and `--level` override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Keep at most this many decoded tiles in memory
    #[arg(long)]
    cache_size: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MapConfig::from_json_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => MapConfig::default(),
    };
    config.tile_dir = cli.tiles.clone();
    if let Some(level) = cli.level {
        config = config.with_start_level(level);
    }
    if let Some(capacity) = cli.cache_size {
        config = config.with_cache(CachePolicy::Lru { capacity });
    }

    let map = Map::new(config)
        .with_context(|| format!("opening tile directory {}", cli.tiles.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_title("slipmap"),
        ..Default::default()
    };

    eframe::run_native(
        "slipmap-app",
        options,
        Box::new(|_cc| Box::new(SlipmapApp::new(map))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

/// The main application struct
struct SlipmapApp {
    map_widget: MapWidget,
    mouse_position: Rc<Cell<Option<GeoPoint>>>,
    level: Rc<Cell<u8>>,
    selected: Rc<Cell<Option<GeoPoint>>>,
    show_layer_panel: bool,
}

impl SlipmapApp {
    fn new(mut map: Map) -> Self {
        let mouse_position = Rc::new(Cell::new(None));
        let level = Rc::new(Cell::new(map.level()));
        let selected = Rc::new(Cell::new(None));

        let sink = Rc::clone(&mouse_position);
        map.on_mouse_position(move |position| sink.set(Some(position)));
        let sink = Rc::clone(&level);
        map.on_level_change(move |level| sink.set(level));

        // Corners of the tile set, clickable so the selection readout has
        // something to show without any application data loaded
        let extent = map.tiles().tile_set().extent();
        let corners = [
            (extent.west, extent.north),
            (extent.east, extent.north),
            (extent.east, extent.south),
            (extent.west, extent.south),
        ];
        let layers = map.layers_mut();
        let outline = layers.add_mono_polygon_layer(
            vec![corners.to_vec()],
            true,
            LayerOptions::polygon()
                .with_colour(Colour::rgb(0, 128, 0))
                .with_name("extent"),
        );
        let markers = layers.add_mono_point_layer(
            corners.iter().map(|&(x, y)| PointRecord::new(x, y)),
            LayerOptions::default().with_name("corners"),
        );
        layers.place_after(outline, markers);

        let sink = Rc::clone(&selected);
        layers.set_point_select_callback(markers, 2.0, move |_, _, hit| {
            sink.set(hit.map(|h| h.point));
            true
        });

        Self {
            map_widget: MapWidget::new(map),
            mouse_position,
            level,
            selected,
            show_layer_panel: true,
        }
    }

    fn layer_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Layers");
        ui.separator();

        // Front-most layer first, like a layer list in a GIS
        let layers = self.map_widget.map_mut().layers_mut();
        let entries: Vec<(LayerId, String, LayerKind, bool)> = layers
            .iter()
            .rev()
            .map(|l| (l.id(), l.name().to_string(), l.kind(), l.is_visible()))
            .collect();

        for (id, name, kind, visible) in entries {
            ui.horizontal(|ui| {
                let mut shown = visible;
                if ui.checkbox(&mut shown, name).changed() {
                    if shown {
                        layers.show_layer(id);
                    } else {
                        layers.hide_layer(id);
                    }
                }
                ui.weak(kind.to_string());
                if ui.small_button("top").clicked() {
                    layers.to_front(id);
                }
                if ui.small_button("bottom").clicked() {
                    layers.to_back(id);
                }
            });
        }
    }
}

impl eframe::App for SlipmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top menu bar
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_layer_panel, "Layer Panel");
                    if ui.button("Log state").clicked() {
                        self.map_widget.map().log_state();
                        self.map_widget.map().layers().log_layers();
                    }
                });

                ui.separator();
                let map = self.map_widget.map_mut();
                if ui.button("Zoom in").clicked() {
                    map.zoom_in(None);
                }
                if ui.button("Zoom out").clicked() {
                    map.zoom_out(None);
                }
                if ui.button("Whole map").clicked() {
                    let extent = map.tiles().tile_set().extent();
                    map.zoom_to_area(extent.center(), (extent.width(), extent.height()));
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.mouse_position.get() {
                    Some(p) => ui.label(format!("Lon {:.4}, Lat {:.4}", p.lon, p.lat)),
                    None => ui.label("Lon -, Lat -"),
                };
                ui.separator();
                ui.label(format!("Level {}", self.level.get()));
                if let Some(p) = self.selected.get() {
                    ui.separator();
                    ui.label(format!("Selected {:.4}, {:.4}", p.lon, p.lat));
                }
            });
        });

        if self.show_layer_panel {
            egui::SidePanel::right("layer_panel")
                .resizable(true)
                .show(ctx, |ui| self.layer_panel(ui));
        }

        // Main map area
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.map_widget(&mut self.map_widget);
            });
    }
}
