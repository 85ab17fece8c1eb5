mod common;

use with_smaa::video::backends::headless::HeadlessDevice;
use with_smaa::video::backends::{Capability, ShaderStage, TextureFormat, Viewport};
use with_smaa::video::GraphicsStateSnapshot;
use with_smaa::{Smaa, SmaaParams};

fn viewport(width: i32, height: i32) -> Viewport {
    Viewport {
        x: 0,
        y: 0,
        width,
        height,
    }
}

#[test]
fn core_context() {
    let (smaa, device) = common::init("4.6.0 NVIDIA 535.54");
    assert!(smaa.is_initialized());
    assert!(!smaa.is_incompatible());
    assert!(!smaa.is_legacy());

    assert!(device.attributes.is_empty());
    for &(_, ref source) in &device.sources {
        assert!(source.starts_with("#version 330\n"));
    }
}

#[test]
fn legacy_context() {
    let (smaa, device) = common::init("3.0 Mesa 23.1.4");
    assert!(smaa.is_legacy());
    assert!(!smaa.is_incompatible());
    assert!(smaa.is_initialized());

    // Each of the three programs binds the quad corners to location 0 before linking.
    assert_eq!(device.attributes.len(), 3);
    for &(location, ref name) in &device.attributes {
        assert_eq!(location, 0);
        assert_eq!(name, "in_texcoord");
    }

    for &(_, ref source) in &device.sources {
        assert!(source.starts_with("#version 130\n"));
    }
}

#[test]
fn incompatible_context() {
    let (smaa, device) = common::init("2.1 Mesa 7.0");
    assert!(smaa.is_incompatible());
    assert!(!smaa.is_initialized());
    assert_eq!(device.counters.objects(), 0);
    assert_eq!(device.counters.writes, 0);
}

#[test]
fn init_once() {
    let (mut smaa, mut device) = common::init("4.6.0");
    let counters = device.counters.clone();
    let sources = device.sources.len();

    unsafe { smaa.init(&mut device) };
    unsafe { smaa.init(&mut device) };

    assert_eq!(device.counters, counters);
    assert_eq!(device.sources.len(), sources);
}

#[test]
fn failed_init_once() {
    let mut device = HeadlessDevice::new("4.6.0");
    device.fail_link = true;
    let mut smaa = Smaa::new(SmaaParams::default(), common::assets());

    unsafe { smaa.init(&mut device) };
    let counters = device.counters.clone();
    assert!(!smaa.is_initialized());

    device.fail_link = false;
    unsafe { smaa.init(&mut device) };
    assert!(!smaa.is_initialized());
    assert_eq!(device.counters, counters);
}

fn assert_untouched(mut smaa: Smaa, mut device: HeadlessDevice) {
    device.vertex_array = 4;
    device.program = 9;
    device.textures[1] = 12;
    device.enabled.insert(Capability::Blend);
    device.clear_color = [1.0, 0.5, 0.25, 1.0];

    let snapshot = unsafe { GraphicsStateSnapshot::save(&mut device) };
    let counters = device.counters.clone();

    for _ in 0..3 {
        unsafe { smaa.update(&mut device) };
    }

    assert_eq!(device.counters, counters);
    assert!(device.copies.is_empty());
    assert!(device.draws.is_empty());
    assert_eq!(unsafe { GraphicsStateSnapshot::save(&mut device) }, snapshot);
}

#[test]
fn no_op_when_incompatible() {
    let (smaa, device) = common::init("2.1");
    assert_untouched(smaa, device);
}

#[test]
fn no_op_when_setup_failed() {
    let mut device = HeadlessDevice::new("4.6.0");
    device.fail_compile = Some(ShaderStage::Vertex);
    let mut smaa = Smaa::new(SmaaParams::default(), common::assets());
    unsafe { smaa.init(&mut device) };

    assert!(!smaa.is_initialized());
    assert!(!smaa.is_incompatible());
    assert_untouched(smaa, device);
}

#[test]
fn no_op_before_init() {
    let smaa = Smaa::new(SmaaParams::default(), common::assets());
    assert_untouched(smaa, HeadlessDevice::new("4.6.0"));
}

#[test]
fn resize_on_dimension_change() {
    let (mut smaa, mut device) = common::init("4.6.0");
    let sizes = [
        (640, 480, false),
        (640, 480, false),
        (800, 480, true),
        (800, 600, true),
        (800, 600, false),
        (640, 480, true),
        (640, 480, false),
    ];

    for &(width, height, resized) in sizes.iter() {
        device.viewport = viewport(width, height);
        let allocations = device.counters.allocations;
        unsafe { smaa.update(&mut device) };

        let expected = if resized { 2 } else { 0 };
        assert_eq!(
            device.counters.allocations - allocations,
            expected,
            "{}x{}",
            width,
            height
        );
    }
}

#[test]
fn color_copies() {
    let (mut smaa, mut device) = common::init("4.6.0");
    unsafe { smaa.update(&mut device) };
    unsafe { smaa.update(&mut device) };

    let formats: Vec<_> = device.copies.iter().map(|v| v.0).collect();
    assert_eq!(
        formats,
        vec![
            TextureFormat::RGBA8,
            TextureFormat::SRGBA8,
            TextureFormat::RGBA8,
            TextureFormat::SRGBA8
        ]
    );
    assert_eq!(device.draws.len(), 6);
}

#[test]
fn frame_is_invisible() {
    let (mut smaa, mut device) = common::init("4.6.0");
    device.vertex_array = 31;
    device.program = 32;
    device.array_buffer = 33;
    device.active_texture = gl::TEXTURE0 + 1;
    device.textures[0] = 41;
    device.textures[1] = 42;
    device.textures[2] = 43;
    device.enabled.insert(Capability::DepthTest);
    device.enabled.insert(Capability::Blend);
    device.enabled.insert(Capability::CullFace);
    device.clear_color = [0.2, 0.3, 0.4, 1.0];

    let snapshot = unsafe { GraphicsStateSnapshot::save(&mut device) };
    unsafe { smaa.update(&mut device) };
    assert!(unsafe { GraphicsStateSnapshot::save(&mut device) } != snapshot);

    unsafe { snapshot.restore(&mut device) };
    assert_eq!(unsafe { GraphicsStateSnapshot::save(&mut device) }, snapshot);
    assert_eq!(device.draws.len(), 3);
}
