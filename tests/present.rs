mod common;

use with_smaa::shim::post_process;
use with_smaa::video::backends::headless::HeadlessDevice;
use with_smaa::video::backends::{Capability, Viewport};
use with_smaa::video::GraphicsStateSnapshot;
use with_smaa::{Smaa, SmaaParams};

fn host(version: &str) -> HeadlessDevice {
    let mut device = HeadlessDevice::new(version);
    device.viewport = Viewport {
        x: 16,
        y: 8,
        width: 800,
        height: 600,
    };
    device.vertex_array = 3;
    device.program = 11;
    device.array_buffer = 6;
    device.active_texture = gl::TEXTURE0 + 1;
    device.textures[0] = 40;
    device.textures[1] = 41;
    device.enabled.insert(Capability::DepthTest);
    device.enabled.insert(Capability::CullFace);
    device.clear_color = [0.2, 0.4, 0.6, 1.0];
    device.draw_framebuffer = 5;
    device.read_framebuffer = 5;
    device.draw_buffers.insert(
        5,
        vec![gl::COLOR_ATTACHMENT0, gl::COLOR_ATTACHMENT1],
    );
    device
}

fn smaa() -> Smaa {
    Smaa::new(SmaaParams::default(), common::assets())
}

#[test]
fn host_state_survives() {
    let mut device = host("4.6.0");
    let mut smaa = smaa();
    let before = unsafe { GraphicsStateSnapshot::save(&mut device) };

    for _ in 0..3 {
        unsafe { post_process(&mut smaa, &mut device) };
        assert_eq!(unsafe { GraphicsStateSnapshot::save(&mut device) }, before);
    }

    assert!(smaa.is_initialized());
    assert_eq!(device.draws.len(), 9);
}

#[test]
fn multiple_draw_buffers_are_kept() {
    let mut device = host("4.6.0");
    let mut smaa = smaa();
    unsafe { post_process(&mut smaa, &mut device) };

    assert_eq!(device.draw_framebuffer, 5);
    assert_eq!(
        device.draw_buffers[&5],
        vec![gl::COLOR_ATTACHMENT0, gl::COLOR_ATTACHMENT1]
    );
}

#[test]
fn setup_once() {
    let mut device = host("4.6.0");
    let mut smaa = smaa();
    unsafe { post_process(&mut smaa, &mut device) };

    let objects = device.counters.objects();
    let allocations = device.counters.allocations;
    for _ in 0..4 {
        unsafe { post_process(&mut smaa, &mut device) };
    }

    assert_eq!(device.counters.objects(), objects);
    assert_eq!(device.counters.allocations, allocations);
    assert_eq!(device.sources.len(), 6);
}

#[test]
fn resize_between_presents() {
    let mut device = host("4.6.0");
    let mut smaa = smaa();
    unsafe { post_process(&mut smaa, &mut device) };
    let allocations = device.counters.allocations;

    device.viewport.width = 1024;
    device.viewport.height = 768;
    let before = unsafe { GraphicsStateSnapshot::save(&mut device) };
    unsafe { post_process(&mut smaa, &mut device) };

    assert!(device.counters.allocations > allocations);
    assert_eq!(unsafe { GraphicsStateSnapshot::save(&mut device) }, before);
}

#[test]
fn incompatible_context_is_left_alone() {
    let mut device = host("2.1 Mesa 20.0.8");
    let mut smaa = smaa();
    let before = unsafe { GraphicsStateSnapshot::save(&mut device) };

    // The first present finds out, and still puts everything back.
    unsafe { post_process(&mut smaa, &mut device) };
    assert!(smaa.is_incompatible());
    assert_eq!(unsafe { GraphicsStateSnapshot::save(&mut device) }, before);

    // From then on the context isn't touched at all.
    let counters = device.counters.clone();
    for _ in 0..3 {
        unsafe { post_process(&mut smaa, &mut device) };
    }

    assert_eq!(device.counters, counters);
    assert_eq!(device.counters.objects(), 0);
    assert!(device.draws.is_empty());
}

#[test]
fn failed_setup_is_left_alone() {
    let mut device = host("4.6.0");
    device.fail_link = true;
    let mut smaa = smaa();
    let before = unsafe { GraphicsStateSnapshot::save(&mut device) };

    unsafe { post_process(&mut smaa, &mut device) };
    assert!(smaa.is_disabled());
    assert_eq!(unsafe { GraphicsStateSnapshot::save(&mut device) }, before);

    device.fail_link = false;
    let counters = device.counters.clone();
    unsafe { post_process(&mut smaa, &mut device) };

    assert_eq!(device.counters, counters);
    assert!(device.draws.is_empty());
}
