//! Captures and restores the part of the graphics context the injected passes disturb.
//!
//! The host keeps rendering right after the present call returns, without any knowledge
//! of the extra work. Everything listed in `GraphicsStateSnapshot` is therefore read
//! before the pipeline runs and written back afterwards. State not listed here is a
//! known limitation.

use super::backends::{Binding, Capability, Device, FramebufferTarget, TextureId, Viewport};

/// Number of texture units whose 2D bindings are preserved.
pub const SNAPSHOT_TEXTURE_UNITS: usize = 3;

const TOGGLES: [Capability; 4] = [
    Capability::DepthTest,
    Capability::Blend,
    Capability::CullFace,
    Capability::FramebufferSrgb,
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GraphicsStateSnapshot {
    pub vertex_array: u32,
    pub program: u32,
    /// The active texture unit, as `GL_TEXTURE0 + i`.
    pub active_texture: u32,
    pub depth_test: bool,
    pub blend: bool,
    pub cull_face: bool,
    pub framebuffer_srgb: bool,
    pub clear_color: [f32; 4],
    pub textures: [TextureId; SNAPSHOT_TEXTURE_UNITS],
    pub array_buffer: u32,
    pub draw_framebuffer: u32,
    pub read_framebuffer: u32,
    pub viewport: Viewport,
}

impl GraphicsStateSnapshot {
    /// Reads the state from the current context.
    ///
    /// The active texture unit is switched while the per-unit bindings are queried, and
    /// switched back before returning.
    pub unsafe fn save<D: Device + ?Sized>(device: &mut D) -> Self {
        let active_texture = device.binding(Binding::ActiveTexture);

        let mut textures = [0; SNAPSHOT_TEXTURE_UNITS];
        for (i, v) in textures.iter_mut().enumerate() {
            device.active_texture(gl::TEXTURE0 + i as u32);
            *v = device.binding(Binding::Texture2D);
        }

        device.active_texture(active_texture);

        GraphicsStateSnapshot {
            vertex_array: device.binding(Binding::VertexArray),
            program: device.binding(Binding::Program),
            active_texture,
            depth_test: device.is_enabled(Capability::DepthTest),
            blend: device.is_enabled(Capability::Blend),
            cull_face: device.is_enabled(Capability::CullFace),
            framebuffer_srgb: device.is_enabled(Capability::FramebufferSrgb),
            clear_color: device.clear_color(),
            textures,
            array_buffer: device.binding(Binding::ArrayBuffer),
            draw_framebuffer: device.binding(Binding::DrawFramebuffer),
            read_framebuffer: device.binding(Binding::ReadFramebuffer),
            viewport: device.viewport(),
        }
    }

    /// Writes every field back into the current context.
    pub unsafe fn restore<D: Device + ?Sized>(&self, device: &mut D) {
        device.bind_framebuffer(FramebufferTarget::Read, self.read_framebuffer);
        device.bind_framebuffer(FramebufferTarget::Draw, self.draw_framebuffer);
        device.set_viewport(self.viewport);

        device.bind_vertex_array(self.vertex_array);
        device.bind_buffer(self.array_buffer);
        device.use_program(self.program);

        for &cap in TOGGLES.iter() {
            if self.is_enabled(cap) {
                device.enable(cap);
            } else {
                device.disable(cap);
            }
        }

        device.set_clear_color(self.clear_color);

        for (i, &texture) in self.textures.iter().enumerate() {
            device.active_texture(gl::TEXTURE0 + i as u32);
            device.bind_texture(texture);
        }

        device.active_texture(self.active_texture);
    }

    /// Returns the stored value of a toggle.
    pub fn is_enabled(&self, cap: Capability) -> bool {
        match cap {
            Capability::DepthTest => self.depth_test,
            Capability::Blend => self.blend,
            Capability::CullFace => self.cull_face,
            Capability::FramebufferSrgb => self.framebuffer_srgb,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::backends::headless::HeadlessDevice;

    fn dirty() -> HeadlessDevice {
        let mut device = HeadlessDevice::new("4.6.0");
        device.vertex_array = 7;
        device.program = 3;
        device.array_buffer = 11;
        device.draw_framebuffer = 5;
        device.read_framebuffer = 6;
        device.viewport = Viewport {
            x: 8,
            y: 16,
            width: 320,
            height: 200,
        };
        device.active_texture = gl::TEXTURE0 + 2;
        device.textures[0] = 21;
        device.textures[1] = 22;
        device.textures[2] = 23;
        device.enabled.insert(Capability::DepthTest);
        device.enabled.insert(Capability::CullFace);
        device.clear_color = [0.1, 0.2, 0.3, 0.4];
        device
    }

    #[test]
    fn save() {
        let mut device = dirty();
        let snapshot = unsafe { GraphicsStateSnapshot::save(&mut device) };

        assert_eq!(snapshot.vertex_array, 7);
        assert_eq!(snapshot.program, 3);
        assert_eq!(snapshot.active_texture, gl::TEXTURE0 + 2);
        assert_eq!(snapshot.textures, [21, 22, 23]);
        assert!(snapshot.depth_test);
        assert!(!snapshot.blend);
        assert!(snapshot.cull_face);
        assert!(!snapshot.framebuffer_srgb);
        assert_eq!(snapshot.clear_color, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(snapshot.viewport.x, 8);
        assert_eq!(snapshot.viewport.height, 200);

        // Querying the per-unit bindings leaves the selector where it was.
        assert_eq!(device.active_texture, gl::TEXTURE0 + 2);
    }

    #[test]
    fn restore() {
        let mut device = dirty();
        let snapshot = unsafe { GraphicsStateSnapshot::save(&mut device) };

        device.vertex_array = 1;
        device.program = 2;
        device.array_buffer = 0;
        device.draw_framebuffer = 0;
        device.read_framebuffer = 0;
        device.active_texture = gl::TEXTURE0;
        device.textures = [9; 16];
        device.enabled.clear();
        device.enabled.insert(Capability::Blend);
        device.enabled.insert(Capability::FramebufferSrgb);
        device.clear_color = [0.0; 4];
        device.viewport = Viewport::default();

        unsafe { snapshot.restore(&mut device) };
        let restored = unsafe { GraphicsStateSnapshot::save(&mut device) };
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn toggles_are_explicit() {
        let mut device = HeadlessDevice::new("4.6.0");
        let snapshot = unsafe { GraphicsStateSnapshot::save(&mut device) };

        let writes = device.counters.writes;
        unsafe { snapshot.restore(&mut device) };

        // Each toggle is written back, either enabled or disabled, even if it is
        // already in the right state.
        assert!(device.counters.writes - writes >= TOGGLES.len());
        for &cap in TOGGLES.iter() {
            assert!(!device.enabled.contains(&cap));
        }
    }
}
