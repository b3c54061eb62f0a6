use pretty_assertions::assert_eq;
use tilemap_core::{
    AddComponentAttribute, AttachComponent, Attribute, AttributeType, Command, CommandError,
    CommandStack, ComponentError, ComponentId, DefineComponent, DetachComponent,
    DuplicateComponentAttribute, LayerId, LayerKind, Map, MatrixExtent, PropertyTarget,
    RemoveComponentAttribute, RemoveComponentDef, RemoveLayer, RenameComponent,
    RenameComponentAttribute, ResetComponent, SetComponentAttributeDefault,
    SetComponentAttributeType, UndoCommand, UpdateComponent,
};

/// A map with a `door` component (`locked: bool`, `key: int`) attached to the map and a layer.
fn door_map() -> (Map, ComponentId, LayerId) {
    let mut map = Map::new(MatrixExtent::new(3, 3)).unwrap();
    let layer = map.add_layer(LayerKind::Object, None).unwrap();
    let door = map.define_component("door").unwrap();
    map.add_component_attribute(door, "locked", Attribute::Bool(true)).unwrap();
    map.add_component_attribute(door, "key", Attribute::Int(0)).unwrap();
    map.attach_component(PropertyTarget::Map, door).unwrap();
    map.attach_component(PropertyTarget::Layer(layer), door).unwrap();
    (map, door, layer)
}

fn value(map: &Map, target: PropertyTarget, component: ComponentId, name: &str) -> Option<Attribute> {
    map.meta(target)?.component(component)?.get(name).cloned()
}

fn attribute_names(map: &Map, component: ComponentId) -> Vec<String> {
    map.components()
        .find(component)
        .unwrap()
        .attributes
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_define_component_undo_redo_keeps_id() {
    let mut map = Map::new(MatrixExtent::new(2, 2)).unwrap();
    let mut stack: CommandStack<Command> = CommandStack::new(16);

    let mut define = DefineComponent::new("spawn");
    define.redo(&mut map).unwrap();
    let spawn = define.component().unwrap();
    stack.store(define.into());
    map.add_component_attribute(spawn, "wave", Attribute::Int(2)).unwrap();

    stack.undo(&mut map).unwrap();
    assert!(map.components().is_empty());

    stack.redo(&mut map).unwrap();
    let def = map.components().find(spawn).unwrap();
    assert_eq!(def.name, "spawn");
    assert_eq!(def.attributes.get("wave"), Some(&Attribute::Int(2)));
}

#[test]
fn test_define_component_rejects_taken_name() {
    let (mut map, door, _) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);

    let result = stack.push(DefineComponent::new("door").into(), &mut map);
    assert_eq!(
        result,
        Err(CommandError::Component(ComponentError::NameTaken("door".to_string())))
    );
    assert_eq!(stack.size(), 0);
    assert_eq!(map.components().iter().map(|def| def.id).collect::<Vec<_>>(), vec![door]);
}

#[test]
fn test_remove_definition_while_attached() {
    let (mut map, door, layer) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);
    map.update_component(PropertyTarget::Layer(layer), door, "key", Attribute::Int(7))
        .unwrap();

    stack.push(RemoveComponentDef::new(door).into(), &mut map).unwrap();
    assert!(map.components().is_empty());
    assert!(map.component_owners(door).is_empty());
    assert!(!map.meta.has_component(door));

    stack.undo(&mut map).unwrap();
    assert_eq!(
        map.component_owners(door),
        vec![PropertyTarget::Map, PropertyTarget::Layer(layer)]
    );
    assert_eq!(
        value(&map, PropertyTarget::Layer(layer), door, "key"),
        Some(Attribute::Int(7))
    );
}

#[test]
fn test_restoring_definition_fails_when_owner_is_gone() {
    let (mut map, door, layer) = door_map();

    let mut remove_def = RemoveComponentDef::new(door);
    remove_def.redo(&mut map).unwrap();
    RemoveLayer::new(layer).redo(&mut map).unwrap();

    assert_eq!(
        remove_def.undo(&mut map),
        Err(CommandError::Component(ComponentError::TargetNotFound(
            PropertyTarget::Layer(layer)
        )))
    );
    assert!(map.components().is_empty());
    assert!(!map.meta.has_component(door));
}

#[test]
fn test_rename_component_merges() {
    let (mut map, door, _) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);

    stack.push(RenameComponent::new(door, "gate").into(), &mut map).unwrap();
    stack.push(RenameComponent::new(door, "portal").into(), &mut map).unwrap();
    assert_eq!(stack.size(), 1);
    assert_eq!(map.components().find(door).unwrap().name, "portal");

    stack.undo(&mut map).unwrap();
    assert_eq!(map.components().find(door).unwrap().name, "door");
}

#[test]
fn test_attribute_commands_reach_attachments() {
    let (mut map, door, layer) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);
    let layer = PropertyTarget::Layer(layer);

    stack
        .push(AddComponentAttribute::new(door, "hint", AttributeType::Str).into(), &mut map)
        .unwrap();
    assert_eq!(value(&map, layer, door, "hint"), Some(Attribute::Str(String::new())));

    stack
        .push(RenameComponentAttribute::new(door, "hint", "label").into(), &mut map)
        .unwrap();
    assert_eq!(value(&map, PropertyTarget::Map, door, "label"), Some(Attribute::Str(String::new())));

    let mut duplicate = DuplicateComponentAttribute::new(door, "key");
    duplicate.redo(&mut map).unwrap();
    assert_eq!(duplicate.copy(), Some("key (1)"));
    stack.store(duplicate.into());
    assert_eq!(attribute_names(&map, door), vec!["key", "key (1)", "label", "locked"]);

    stack.undo(&mut map).unwrap();
    stack.undo(&mut map).unwrap();
    stack.undo(&mut map).unwrap();
    assert_eq!(attribute_names(&map, door), vec!["key", "locked"]);
    assert_eq!(value(&map, layer, door, "hint"), None);
    assert_eq!(value(&map, layer, door, "label"), None);
}

#[test]
fn test_remove_attribute_restores_attached_values() {
    let (mut map, door, layer) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);
    let layer = PropertyTarget::Layer(layer);
    map.update_component(layer, door, "locked", Attribute::Bool(false)).unwrap();

    stack
        .push(RemoveComponentAttribute::new(door, "locked").into(), &mut map)
        .unwrap();
    assert_eq!(attribute_names(&map, door), vec!["key"]);
    assert_eq!(value(&map, layer, door, "locked"), None);

    stack.undo(&mut map).unwrap();
    assert_eq!(value(&map, layer, door, "locked"), Some(Attribute::Bool(false)));
    assert_eq!(
        value(&map, PropertyTarget::Map, door, "locked"),
        Some(Attribute::Bool(true))
    );
}

#[test]
fn test_change_attribute_type_resets_and_restores_values() {
    let (mut map, door, layer) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);
    let layer = PropertyTarget::Layer(layer);
    map.update_component(layer, door, "key", Attribute::Int(12)).unwrap();

    stack
        .push(SetComponentAttributeType::new(door, "key", AttributeType::Str).into(), &mut map)
        .unwrap();
    assert_eq!(value(&map, layer, door, "key"), Some(Attribute::Str(String::new())));
    assert_eq!(
        map.components().find(door).unwrap().attributes.get("key"),
        Some(&Attribute::Str(String::new()))
    );

    stack.undo(&mut map).unwrap();
    assert_eq!(value(&map, layer, door, "key"), Some(Attribute::Int(12)));
    assert_eq!(
        map.components().find(door).unwrap().attributes.get("key"),
        Some(&Attribute::Int(0))
    );
}

#[test]
fn test_default_change_only_affects_new_attachments() {
    let (mut map, door, layer) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);
    let layer = PropertyTarget::Layer(layer);

    stack
        .push(SetComponentAttributeDefault::new(door, "key", Attribute::Int(3)).into(), &mut map)
        .unwrap();
    stack
        .push(SetComponentAttributeDefault::new(door, "key", Attribute::Int(5)).into(), &mut map)
        .unwrap();
    assert_eq!(stack.size(), 1);
    assert_eq!(value(&map, layer, door, "key"), Some(Attribute::Int(0)));

    stack.push(ResetComponent::new(layer, door).into(), &mut map).unwrap();
    assert_eq!(value(&map, layer, door, "key"), Some(Attribute::Int(5)));

    stack.undo(&mut map).unwrap();
    stack.undo(&mut map).unwrap();
    assert_eq!(value(&map, layer, door, "key"), Some(Attribute::Int(0)));
    assert_eq!(
        map.components().find(door).unwrap().attributes.get("key"),
        Some(&Attribute::Int(0))
    );
}

#[test]
fn test_attach_detach_update() {
    let (mut map, door, layer) = door_map();
    let mut stack: CommandStack<Command> = CommandStack::new(16);
    let spawn = map.define_component("spawn").unwrap();
    map.add_component_attribute(spawn, "wave", Attribute::Int(1)).unwrap();
    let layer = PropertyTarget::Layer(layer);

    stack.push(AttachComponent::new(layer, spawn).into(), &mut map).unwrap();
    assert_eq!(value(&map, layer, spawn, "wave"), Some(Attribute::Int(1)));
    assert_eq!(
        stack.push(AttachComponent::new(layer, spawn).into(), &mut map),
        Err(CommandError::Component(ComponentError::AlreadyAttached {
            target: layer,
            component: spawn,
        }))
    );

    stack
        .push(UpdateComponent::new(layer, spawn, "wave", Attribute::Int(2)).into(), &mut map)
        .unwrap();
    stack
        .push(UpdateComponent::new(layer, spawn, "wave", Attribute::Int(3)).into(), &mut map)
        .unwrap();
    assert_eq!(stack.size(), 2);
    assert_eq!(
        stack.push(
            UpdateComponent::new(layer, spawn, "wave", Attribute::Bool(true)).into(),
            &mut map
        ),
        Err(CommandError::Component(ComponentError::TypeMismatch {
            expected: AttributeType::Int,
            actual: AttributeType::Bool,
        }))
    );

    stack.push(DetachComponent::new(layer, door).into(), &mut map).unwrap();
    assert!(!map.meta(layer).unwrap().has_component(door));

    stack.undo(&mut map).unwrap();
    assert_eq!(value(&map, layer, door, "locked"), Some(Attribute::Bool(true)));
    stack.undo(&mut map).unwrap();
    assert_eq!(value(&map, layer, spawn, "wave"), Some(Attribute::Int(1)));
    stack.undo(&mut map).unwrap();
    assert!(!map.meta(layer).unwrap().has_component(spawn));
}
