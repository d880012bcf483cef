use pretty_assertions::assert_eq;
use scenic::{ArgValues, BindingFunction, CallError, HostError, ItemId, MemoryHost, Object, SceneId, call};

/// A studio with one scene ("Main") holding one item ("Camera").
fn studio() -> (MemoryHost, SceneId, ItemId) {
    let mut host = MemoryHost::new();
    let main = host.add_scene("Main");
    let camera = host.add_item(main, "Camera");
    (host, main, camera)
}

fn expect_scene(value: Object) -> SceneId {
    match value {
        Object::Scene(id) => id,
        other => panic!("expected scene handle, got {other:?}"),
    }
}

fn expect_item(value: Object) -> ItemId {
    match value {
        Object::Item(id) => id,
        other => panic!("expected item handle, got {other:?}"),
    }
}

#[test]
fn full_lifecycle_through_raw_calls() {
    let (mut host, main, camera) = studio();

    // sceneFind("Main") -> scene handle
    let scene = call(&mut host, BindingFunction::SceneFind, ArgValues::One(Object::from("Main"))).unwrap();
    let scene = expect_scene(scene);
    assert_eq!(scene, main);
    assert_eq!(host.live_scene_refs(main), 1);

    // sceneItemFind(scene, "Camera") -> item handle
    let item = call(
        &mut host,
        BindingFunction::SceneItemFind,
        ArgValues::Two(Object::Scene(scene), Object::from("Camera")),
    )
    .unwrap();
    let item = expect_item(item);
    assert_eq!(item, camera);

    // sceneItemSetVisible(item, false)
    let result = call(
        &mut host,
        BindingFunction::SceneItemSetVisible,
        ArgValues::Two(Object::Item(item), Object::Bool(false)),
    )
    .unwrap();
    assert!(result.is_none());
    assert!(!host.item_visible(camera));

    // sceneItemFind(scene, "Missing") -> none, no side effect
    let missing = call(
        &mut host,
        BindingFunction::SceneItemFind,
        ArgValues::Two(Object::Scene(scene), Object::from("Missing")),
    )
    .unwrap();
    assert!(missing.is_none());
    assert_eq!(host.item_release_count(), 0);

    // Finalizers: release each handle exactly once.
    call(&mut host, BindingFunction::SceneItemRelease, ArgValues::One(Object::Item(item))).unwrap();
    call(&mut host, BindingFunction::SceneRelease, ArgValues::One(Object::Scene(scene))).unwrap();
    assert_eq!(host.scene_release_count(), 1);
    assert_eq!(host.item_release_count(), 1);
    assert_eq!(host.live_scene_refs(main), 0);
    assert_eq!(host.live_item_refs(camera), 0);
}

#[test]
fn lookup_miss_returns_script_null() {
    let (mut host, _, _) = studio();

    let result = call(&mut host, BindingFunction::SceneFind, ArgValues::One(Object::from("Missing"))).unwrap();
    assert_eq!(result, Object::None);
    assert_eq!(host.scene_release_count(), 0);
}

#[test]
fn select_through_raw_call() {
    let (mut host, main, _) = studio();

    let scene = call(&mut host, BindingFunction::SceneFind, ArgValues::One(Object::from("Main"))).unwrap();
    let scene = expect_scene(scene);

    call(&mut host, BindingFunction::SceneSelect, ArgValues::One(Object::Scene(scene))).unwrap();
    assert_eq!(host.active_scene(), Some(main));
}

#[test]
fn wrong_arity_is_rejected_before_the_host_is_touched() {
    let (mut host, main, _) = studio();

    let err = call(&mut host, BindingFunction::SceneFind, ArgValues::Empty).unwrap_err();
    assert_eq!(
        err,
        CallError::Arity {
            function: BindingFunction::SceneFind,
            expected: 1,
            given: 0,
        }
    );

    let err = call(
        &mut host,
        BindingFunction::SceneItemFind,
        ArgValues::One(Object::from("Camera")),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CallError::Arity {
            function: BindingFunction::SceneItemFind,
            expected: 2,
            given: 1,
        }
    );

    // No acquisition or release happened.
    assert_eq!(host.live_scene_refs(main), 0);
    assert_eq!(host.scene_release_count(), 0);
}

#[test]
fn wrong_argument_type_is_rejected_before_the_host_is_touched() {
    let (mut host, main, _) = studio();

    let err = call(&mut host, BindingFunction::SceneFind, ArgValues::One(Object::Int(3))).unwrap_err();
    assert_eq!(
        err,
        CallError::Type {
            function: BindingFunction::SceneFind,
            expected: "string",
            given: "int",
        }
    );

    let err = call(
        &mut host,
        BindingFunction::SceneSelect,
        ArgValues::One(Object::from("Main")),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CallError::Type {
            function: BindingFunction::SceneSelect,
            expected: "scene",
            given: "string",
        }
    );

    // An item handle is not a scene handle.
    let err = call(
        &mut host,
        BindingFunction::SceneRelease,
        ArgValues::One(Object::Item(ItemId::new(0))),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CallError::Type {
            function: BindingFunction::SceneRelease,
            expected: "scene",
            given: "sceneitem",
        }
    );

    assert_eq!(host.live_scene_refs(main), 0);
    assert_eq!(host.scene_release_count(), 0);
}

#[test]
fn unknown_handle_surfaces_the_host_error() {
    let (mut host, _, _) = studio();

    let bogus = SceneId::new(99);
    let err = call(&mut host, BindingFunction::SceneSelect, ArgValues::One(Object::Scene(bogus))).unwrap_err();
    assert_eq!(err, CallError::Host(HostError::UnknownScene(bogus)));
    assert_eq!(err.to_string(), "unknown scene handle #99");

    let bogus = ItemId::new(99);
    let err = call(
        &mut host,
        BindingFunction::SceneItemSetVisible,
        ArgValues::Two(Object::Item(bogus), Object::Bool(true)),
    )
    .unwrap_err();
    assert_eq!(err, CallError::Host(HostError::UnknownItem(bogus)));
}

#[test]
fn visibility_argument_is_coerced() {
    let (mut host, _, camera) = studio();

    let scene = expect_scene(call(&mut host, BindingFunction::SceneFind, ArgValues::One(Object::from("Main"))).unwrap());
    let item = expect_item(
        call(
            &mut host,
            BindingFunction::SceneItemFind,
            ArgValues::Two(Object::Scene(scene), Object::from("Camera")),
        )
        .unwrap(),
    );

    call(
        &mut host,
        BindingFunction::SceneItemSetVisible,
        ArgValues::Two(Object::Item(item), Object::from("")),
    )
    .unwrap();
    assert!(!host.item_visible(camera));

    call(
        &mut host,
        BindingFunction::SceneItemSetVisible,
        ArgValues::Two(Object::Item(item), Object::from("x")),
    )
    .unwrap();
    assert!(host.item_visible(camera));
}
