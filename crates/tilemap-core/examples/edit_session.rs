//! Edit session example
//!
//! Builds a small map through a `MapDocument`, paints with a stroke, fills, undoes and prints
//! the resulting IR. Run with `RUST_LOG=tilemap_core=debug` to see the core's tracing output.

use std::sync::{Arc, Mutex};

use tilemap_core::{
    Float2, LayerKind, MapDocument, ObjectKind, StrokeSession, TileMatrix, TilePattern, TilePos,
};
use tilemap_core_settings::EditorSettings;
use tracing_subscriber::EnvFilter;

const SETTINGS: &str = "\
tile_format: sparse
map_extent: {rows: 6, cols: 8}
command_capacity: 32
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = EditorSettings::from_yaml_str(SETTINGS)?;
    let mut document = MapDocument::with_settings(&settings)?;

    let changes = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&changes);
    document.subscribe(move |change| {
        if let Ok(mut count) = counter.lock() {
            *count += 1;
        }
        println!(
            "  change {:?} {:?} (version {} -> {})",
            change.kind, change.command, change.old_version, change.new_version
        );
    });

    println!("1. Layers and tilesets:");
    let terrain = document.add_tileset("terrain", 16, 4)?;
    let ground = document.add_layer(LayerKind::Tile, None)?;
    let group = document.add_layer(LayerKind::Group, None)?;
    let markers = document.add_layer(LayerKind::Object, Some(group))?;
    document.rename_layer(ground, "Ground")?;

    println!("\n2. Painting a stroke:");
    let mut stroke = StrokeSession::stamp(ground);
    let brush = TilePattern::new(2, 2, vec![1, 2, 5, 6]).ok_or("bad brush")?;
    for col in 1..7 {
        document.stamp_stroke(&mut stroke, TilePos::new(2, col), &brush)?;
    }
    document.finish_stroke(stroke);
    print_layer(&document, ground);

    println!("\n3. Flood fill and undo:");
    document.flood_fill(ground, TilePos::new(5, 0), 9)?;
    print_layer(&document, ground);
    document.undo()?;
    println!("  undo available: {:?}", document.undo_text());

    println!("\n4. Objects:");
    let spawn = document.add_object(
        markers,
        ObjectKind::Point,
        Float2::new(48.0, 80.0),
        Float2::default(),
    )?;
    println!("  added {spawn} to {markers}");

    println!("\n5. Viewport:");
    document.zoom_in();
    document.pan(Float2::new(-16.0, -16.0));
    println!(
        "  zoom {:.2}, tile under (100, 100): {:?}",
        document.viewport().zoom(),
        document.tile_at_screen(Float2::new(100.0, 100.0))
    );

    println!("\n6. IR:");
    println!("{}", serde_json::to_string_pretty(&document.map().to_ir())?);

    document.mark_as_clean();
    println!(
        "\n{} changes, version {}, tileset {:?}, clean: {}",
        changes.lock().map(|count| *count).unwrap_or_default(),
        document.version(),
        terrain,
        document.is_clean()
    );
    Ok(())
}

fn print_layer(document: &MapDocument, layer: tilemap_core::LayerId) {
    let Some(tiles) = document.map().tree().find_tile_layer(layer) else {
        return;
    };
    let extent = tiles.extent();
    for row in 0..extent.rows as i32 {
        let line: Vec<String> = (0..extent.cols as i32)
            .map(|col| format!("{:2}", tiles.tile_at(TilePos::new(row, col)).unwrap_or(0)))
            .collect();
        println!("  {}", line.join(" "));
    }
}
