use std::borrow::Cow;

use with_smaa::smaa::assets::Assets;
use with_smaa::video::backends::headless::HeadlessDevice;
use with_smaa::{Smaa, SmaaParams};

pub fn assets() -> Assets {
    Assets {
        area: Cow::Owned(vec![0x7f; 160 * 560 * 2]),
        search: Cow::Owned(vec![0x7f; 64 * 16]),
        shader_body: Cow::Borrowed("vec4 SMAALumaEdgeDetectionPS();\n"),
    }
}

pub fn init(version: &str) -> (Smaa, HeadlessDevice) {
    let mut device = HeadlessDevice::new(version);
    let mut smaa = Smaa::new(SmaaParams::default(), assets());
    unsafe { smaa.init(&mut device) };
    (smaa, device)
}
