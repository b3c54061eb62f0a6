use pretty_assertions::assert_eq;
use tilemap_core::{
    AddColumns, AddRows, AddTileset, Command, CommandError, CommandStack, EraserSequence,
    FixTiles, FloodFill, LayerId, LayerKind, LayerTileCache, Map, MatrixExtent, RemoveColumns,
    RemoveRows, RemoveTileset, ResizeMap, StampSequence, TileCache, TileFormat, TileMatrix,
    TilePos, UndoCommand,
};

fn map_with_layer(rows: usize, cols: usize) -> (Map, LayerId) {
    let mut map = Map::new(MatrixExtent::new(rows, cols)).unwrap();
    let layer = map.add_layer(LayerKind::Tile, None).unwrap();
    (map, layer)
}

fn tile(map: &Map, layer: LayerId, row: i32, col: i32) -> Option<u32> {
    map.tree()
        .find_tile_layer(layer)
        .unwrap()
        .tile_at(TilePos::new(row, col))
}

fn layer_extent(map: &Map, layer: LayerId) -> MatrixExtent {
    map.tree().find_tile_layer(layer).unwrap().extent()
}

#[test]
fn test_add_rows_merge_into_one_command() {
    let (mut map, layer) = map_with_layer(5, 5);
    let mut stack: CommandStack<Command> = CommandStack::new(16);

    for _ in 0..3 {
        stack.push(AddRows::new(1).into(), &mut map).unwrap();
    }
    assert_eq!(map.extent(), MatrixExtent::new(8, 5));
    assert_eq!(layer_extent(&map, layer), MatrixExtent::new(8, 5));
    assert_eq!(stack.size(), 1);
    assert_eq!(stack.undo_text(), Some("Add Rows"));

    stack.undo(&mut map).unwrap();
    assert_eq!(map.extent(), MatrixExtent::new(5, 5));
    assert_eq!(layer_extent(&map, layer), MatrixExtent::new(5, 5));

    stack.redo(&mut map).unwrap();
    assert_eq!(map.extent(), MatrixExtent::new(8, 5));
}

#[test]
fn test_restore_tiles_skips_positions_and_layers_that_are_gone() {
    let (mut map, layer) = map_with_layer(3, 3);
    let removed = map.add_layer(LayerKind::Tile, None).unwrap();
    map.remove_layer(removed).unwrap();
    map.resize(MatrixExtent::new(2, 2)).unwrap();

    let mut cache = LayerTileCache::new();
    cache.insert(layer, [(TilePos::new(1, 1), 4), (TilePos::new(2, 2), 5)].into());
    cache.insert(removed, [(TilePos::new(0, 0), 6)].into());
    map.restore_tiles(&cache);

    assert_eq!(tile(&map, layer, 1, 1), Some(4));
    assert_eq!(tile(&map, layer, 2, 2), None);
    assert_eq!(layer_extent(&map, layer), MatrixExtent::new(2, 2));
}

#[test]
fn test_add_columns() {
    let (mut map, layer) = map_with_layer(2, 2);
    let mut command = AddColumns::new(2);

    command.redo(&mut map).unwrap();
    assert_eq!(layer_extent(&map, layer), MatrixExtent::new(2, 4));
    command.undo(&mut map).unwrap();
    assert_eq!(layer_extent(&map, layer), MatrixExtent::new(2, 2));
}

#[test]
fn test_remove_rows_restores_tiles_on_undo() {
    let (mut map, layer) = map_with_layer(4, 3);
    map.set_tile(layer, TilePos::new(3, 2), 7).unwrap();
    map.set_tile(layer, TilePos::new(2, 0), 5).unwrap();
    map.set_tile(layer, TilePos::new(0, 0), 1).unwrap();
    let mut stack: CommandStack<Command> = CommandStack::new(16);

    stack.push(RemoveRows::new(1).into(), &mut map).unwrap();
    stack.push(RemoveRows::new(1).into(), &mut map).unwrap();
    assert_eq!(stack.size(), 1);
    assert_eq!(map.extent(), MatrixExtent::new(2, 3));
    assert_eq!(tile(&map, layer, 3, 2), None);

    stack.undo(&mut map).unwrap();
    assert_eq!(map.extent(), MatrixExtent::new(4, 3));
    assert_eq!(tile(&map, layer, 3, 2), Some(7));
    assert_eq!(tile(&map, layer, 2, 0), Some(5));
    assert_eq!(tile(&map, layer, 0, 0), Some(1));
}

#[test]
fn test_remove_columns_cannot_empty_the_map() {
    let (mut map, layer) = map_with_layer(2, 2);
    let mut stack: CommandStack<Command> = CommandStack::new(16);

    let result = stack.push(RemoveColumns::new(2).into(), &mut map);
    assert!(matches!(result, Err(CommandError::InvalidArgument(_))));
    assert_eq!(stack.size(), 0);
    assert_eq!(layer_extent(&map, layer), MatrixExtent::new(2, 2));

    map.set_tile(layer, TilePos::new(1, 1), 3).unwrap();
    stack.push(RemoveColumns::new(1).into(), &mut map).unwrap();
    assert_eq!(map.extent(), MatrixExtent::new(2, 1));
    stack.undo(&mut map).unwrap();
    assert_eq!(tile(&map, layer, 1, 1), Some(3));
}

#[test]
fn test_resize_map() {
    let mut map = Map::with_format(MatrixExtent::new(4, 4), TileFormat::Sparse).unwrap();
    let first = map.add_layer(LayerKind::Tile, None).unwrap();
    let group = map.add_layer(LayerKind::Group, None).unwrap();
    let nested = map.add_layer(LayerKind::Tile, Some(group)).unwrap();
    map.set_tile(first, TilePos::new(3, 3), 2).unwrap();
    map.set_tile(nested, TilePos::new(0, 3), 4).unwrap();

    let mut command = ResizeMap::new(MatrixExtent::new(2, 6));
    command.redo(&mut map).unwrap();
    assert_eq!(layer_extent(&map, first), MatrixExtent::new(2, 6));
    assert_eq!(layer_extent(&map, nested), MatrixExtent::new(2, 6));
    assert_eq!(tile(&map, nested, 0, 3), Some(4));

    command.undo(&mut map).unwrap();
    assert_eq!(map.extent(), MatrixExtent::new(4, 4));
    assert_eq!(tile(&map, first, 3, 3), Some(2));
    assert_eq!(tile(&map, nested, 0, 3), Some(4));

    let mut invalid = ResizeMap::new(MatrixExtent::new(0, 3));
    assert!(invalid.redo(&mut map).is_err());
    assert_eq!(map.extent(), MatrixExtent::new(4, 4));
}

#[test]
fn test_flood_fill_command() {
    let (mut map, layer) = map_with_layer(3, 3);
    map.set_tile(layer, TilePos::new(1, 0), 1).unwrap();
    map.set_tile(layer, TilePos::new(1, 1), 1).unwrap();
    map.set_tile(layer, TilePos::new(1, 2), 1).unwrap();

    let mut command = FloodFill::new(layer, TilePos::new(0, 0), 9);
    command.redo(&mut map).unwrap();
    assert_eq!(command.affected().len(), 3);
    assert_eq!(tile(&map, layer, 0, 2), Some(9));
    assert_eq!(tile(&map, layer, 2, 2), Some(0));

    command.undo(&mut map).unwrap();
    assert_eq!(tile(&map, layer, 0, 2), Some(0));
    assert_eq!(tile(&map, layer, 1, 1), Some(1));
}

#[test]
fn test_flood_fill_on_missing_layer_fails() {
    let (mut map, layer) = map_with_layer(3, 3);
    map.remove_layer(layer).unwrap();
    let mut command = FloodFill::new(layer, TilePos::new(0, 0), 9);
    assert_eq!(command.redo(&mut map), Err(CommandError::LayerNotFound(layer)));
}

#[test]
fn test_stamp_and_eraser_sequences() {
    let (mut map, layer) = map_with_layer(3, 3);
    map.set_tile(layer, TilePos::new(0, 0), 4).unwrap();

    let old: TileCache = [(TilePos::new(0, 0), 4), (TilePos::new(0, 1), 0)].into();
    let new: TileCache = [(TilePos::new(0, 0), 6), (TilePos::new(0, 1), 6)].into();
    let mut stamp = StampSequence::new(layer, old, new);
    stamp.redo(&mut map).unwrap();
    assert_eq!(tile(&map, layer, 0, 1), Some(6));
    stamp.undo(&mut map).unwrap();
    assert_eq!(tile(&map, layer, 0, 0), Some(4));
    assert_eq!(tile(&map, layer, 0, 1), Some(0));

    let mut eraser = EraserSequence::new(layer, [(TilePos::new(0, 0), 4)].into());
    eraser.redo(&mut map).unwrap();
    assert_eq!(tile(&map, layer, 0, 0), Some(0));
    eraser.undo(&mut map).unwrap();
    assert_eq!(tile(&map, layer, 0, 0), Some(4));
}

#[test]
fn test_stamp_outside_layer_changes_nothing() {
    let (mut map, layer) = map_with_layer(2, 2);
    let new: TileCache = [(TilePos::new(0, 0), 1), (TilePos::new(5, 5), 1)].into();
    let mut stamp = StampSequence::new(layer, TileCache::new(), new);

    assert!(stamp.redo(&mut map).is_err());
    assert_eq!(tile(&map, layer, 0, 0), Some(0));
}

#[test]
fn test_tilesets_and_fix_tiles() {
    let (mut map, layer) = map_with_layer(2, 2);
    let mut stack: CommandStack<Command> = CommandStack::new(16);

    let mut add = AddTileset::new("terrain", 10, 5, (16, 16));
    add.redo(&mut map).unwrap();
    let terrain = add.tileset().unwrap();
    stack.store(add.into());
    assert_eq!(map.tilesets().active(), Some(terrain));
    assert_eq!(map.tilesets().find(terrain).unwrap().first_tile, 1);

    let mut add = AddTileset::new("props", 4, 2, (16, 16));
    add.redo(&mut map).unwrap();
    let props = add.tileset().unwrap();
    stack.store(add.into());
    assert_eq!(map.tilesets().find(props).unwrap().first_tile, 11);

    map.set_tile(layer, TilePos::new(0, 0), 3).unwrap();
    map.set_tile(layer, TilePos::new(0, 1), 12).unwrap();
    map.set_tile(layer, TilePos::new(1, 1), 99).unwrap();

    // Detaching leaves tiles alone; fixing clears them.
    stack.push(RemoveTileset::new(props).into(), &mut map).unwrap();
    assert_eq!(map.tilesets().len(), 1);
    assert_eq!(tile(&map, layer, 0, 1), Some(12));

    stack.push(FixTiles::new().into(), &mut map).unwrap();
    assert_eq!(tile(&map, layer, 0, 0), Some(3));
    assert_eq!(tile(&map, layer, 0, 1), Some(0));
    assert_eq!(tile(&map, layer, 1, 1), Some(0));

    stack.undo(&mut map).unwrap();
    assert_eq!(tile(&map, layer, 0, 1), Some(12));
    assert_eq!(tile(&map, layer, 1, 1), Some(99));

    stack.undo(&mut map).unwrap();
    assert_eq!(map.tilesets().len(), 2);
    assert_eq!(map.tilesets().iter().map(|t| t.id).collect::<Vec<_>>(), vec![terrain, props]);

    stack.undo(&mut map).unwrap();
    stack.undo(&mut map).unwrap();
    assert!(map.tilesets().is_empty());
    assert_eq!(map.tilesets().active(), None);

    // Redo re-attaches the very same tilesets.
    stack.redo(&mut map).unwrap();
    stack.redo(&mut map).unwrap();
    assert_eq!(map.tilesets().find(props).unwrap().first_tile, 11);
}

#[test]
fn test_tileset_undo_restores_selection() {
    let mut map = Map::new(MatrixExtent::new(2, 2)).unwrap();
    let mut stack: CommandStack<Command> = CommandStack::new(16);
    stack.push(AddTileset::new("a", 4, 2, (16, 16)).into(), &mut map).unwrap();
    stack.push(AddTileset::new("b", 4, 2, (16, 16)).into(), &mut map).unwrap();
    let ids: Vec<_> = map.tilesets().iter().map(|tileset| tileset.id).collect();
    let (a, b) = (ids[0], ids[1]);
    assert_eq!(map.tilesets().active(), Some(b));

    // Undoing an add goes back to the tileset selected before, not the first one.
    stack.push(AddTileset::new("c", 4, 2, (16, 16)).into(), &mut map).unwrap();
    assert_ne!(map.tilesets().active(), Some(b));
    stack.undo(&mut map).unwrap();
    assert_eq!(map.tilesets().active(), Some(b));

    // Restoring an unselected tileset leaves the selection alone.
    map.tilesets_mut().select(a);
    stack.push(RemoveTileset::new(b).into(), &mut map).unwrap();
    assert_eq!(map.tilesets().active(), Some(a));
    stack.undo(&mut map).unwrap();
    assert_eq!(map.tilesets().active(), Some(a));
    assert_eq!(map.tilesets().iter().map(|t| t.id).collect::<Vec<_>>(), vec![a, b]);

    // Restoring the selected tileset selects it again.
    map.tilesets_mut().select(b);
    stack.push(RemoveTileset::new(b).into(), &mut map).unwrap();
    assert_eq!(map.tilesets().active(), Some(a));
    stack.undo(&mut map).unwrap();
    assert_eq!(map.tilesets().active(), Some(b));
}

#[test]
fn test_add_tileset_without_tiles_fails() {
    let mut map = Map::new(MatrixExtent::new(2, 2)).unwrap();
    let mut command = AddTileset::new("empty", 0, 1, (8, 8));
    assert!(matches!(
        command.redo(&mut map),
        Err(CommandError::InvalidArgument(_))
    ));
    assert!(map.tilesets().is_empty());
}

#[test]
fn test_remove_missing_tileset_fails() {
    let mut map = Map::new(MatrixExtent::new(2, 2)).unwrap();
    let mut add = AddTileset::new("terrain", 4, 2, (8, 8));
    add.redo(&mut map).unwrap();
    let id = add.tileset().unwrap();
    add.undo(&mut map).unwrap();

    let mut remove = RemoveTileset::new(id);
    assert_eq!(remove.redo(&mut map), Err(CommandError::TilesetNotFound(id)));
}
