//! Parameters and timing for the animated veil drawn behind the page.
//!
//! The WebGL plumbing lives in `wasm::render`; everything here is plain data
//! so the frame maths can be tested off the browser.

use serde::{Deserialize, Serialize};

/// Time and warp multiplier applied while the pointer rests on an
/// interactive element.
pub const INTERACTION_BOOST: f32 = 2.5;

/// Longest frame delta fed into the clock. A tab coming back from the
/// background would otherwise jump the animation forward.
pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VeilConfig {
    /// Palette rotation in degrees.
    pub hue_shift: f32,
    pub speed: f32,
    pub warp_amount: f32,
    pub scanline_intensity: f32,
    pub noise_intensity: f32,
    pub scanline_frequency: f32,
    pub is_interacting: bool,
    /// Fraction of the device pixel resolution used for the backing store.
    pub resolution_scale: f32,
}

impl Default for VeilConfig {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            speed: 0.1,
            warp_amount: 0.2,
            scanline_intensity: 0.1,
            noise_intensity: 0.03,
            scanline_frequency: 700.0,
            is_interacting: false,
            resolution_scale: 1.0,
        }
    }
}

impl VeilConfig {
    fn boost(&self) -> f32 {
        if self.is_interacting {
            INTERACTION_BOOST
        } else {
            1.0
        }
    }

    pub fn effective_warp(&self) -> f32 {
        self.warp_amount * self.boost()
    }
}

/// Values uploaded to the fragment shader for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub time: f32,
    pub resolution: (f32, f32),
    pub hue_shift: f32,
    pub noise: f32,
    pub scan: f32,
    pub scan_freq: f32,
    pub warp: f32,
}

/// Animation time accumulator. Advanced from `requestAnimationFrame`
/// timestamps, scaled by the live configuration.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    elapsed: f32,
    last_timestamp_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance to `timestamp_ms` and return the new shader time. The first
    /// call only anchors the clock.
    pub fn tick(&mut self, timestamp_ms: f64, config: &VeilConfig) -> f32 {
        let delta_ms = match self.last_timestamp_ms {
            Some(last) => (timestamp_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);
        self.elapsed += (delta_ms / 1000.0) as f32 * config.speed * config.boost();
        self.elapsed
    }

    pub fn uniforms(&self, config: &VeilConfig, resolution: (u32, u32)) -> FrameUniforms {
        FrameUniforms {
            time: self.elapsed,
            resolution: (resolution.0 as f32, resolution.1 as f32),
            hue_shift: config.hue_shift,
            noise: config.noise_intensity,
            scan: config.scanline_intensity,
            scan_freq: config.scanline_frequency,
            warp: config.effective_warp(),
        }
    }
}

/// Backing-store size for a full-viewport canvas.
pub fn canvas_size(viewport: (f64, f64), device_pixel_ratio: f64, resolution_scale: f32) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let scale = dpr * f64::from(resolution_scale.max(0.0));
    let w = (viewport.0 * scale).round().max(1.0);
    let h = (viewport.1 * scale).round().max(1.0);
    (w as u32, h as u32)
}

pub const VERTEX_SHADER: &str = r"#version 300 es
precision highp float;
// Fullscreen triangle; no vertex buffer contents beyond the three corners.
layout(location = 0) in vec2 aPosition;
void main() {
    gl_Position = vec4(aPosition, 0.0, 1.0);
}
";

pub const FRAGMENT_SHADER: &str = r"#version 300 es
precision highp float;

uniform float uTime;
uniform vec2 uResolution;
uniform float uHueShift;
uniform float uNoise;
uniform float uScan;
uniform float uScanFreq;
uniform float uWarp;

out vec4 fragColor;

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453);
}

float noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    vec2 u = f * f * (3.0 - 2.0 * f);
    return mix(mix(hash(i), hash(i + vec2(1.0, 0.0)), u.x),
               mix(hash(i + vec2(0.0, 1.0)), hash(i + vec2(1.0, 1.0)), u.x), u.y);
}

float fbm(vec2 p) {
    float v = 0.0;
    float a = 0.5;
    mat2 m = mat2(1.6, 1.2, -1.2, 1.6);
    for (int i = 0; i < 5; i++) {
        v += a * noise(p);
        p = m * p;
        a *= 0.5;
    }
    return v;
}

vec3 hueShiftRGB(vec3 col, float deg) {
    const mat3 toYIQ = mat3(0.299, 0.596, 0.211,
                            0.587, -0.274, -0.523,
                            0.114, -0.322, 0.312);
    const mat3 toRGB = mat3(1.0, 1.0, 1.0,
                            0.956, -0.272, -1.106,
                            0.621, -0.647, 1.703);
    vec3 yiq = toYIQ * col;
    float h = radians(deg);
    float c = cos(h);
    float s = sin(h);
    yiq.yz = mat2(c, s, -s, c) * yiq.yz;
    return clamp(toRGB * yiq, 0.0, 1.0);
}

void main() {
    vec2 p = (gl_FragCoord.xy - 0.5 * uResolution) / min(uResolution.x, uResolution.y);
    float t = uTime * 6.0;

    p += uWarp * 0.5 * vec2(sin(p.y * 6.0 + t * 1.3), cos(p.x * 6.0 + t * 1.1));

    vec2 q = vec2(fbm(p * 1.5 + t * 0.2), fbm(p * 1.5 - t * 0.15 + 3.1));
    float f = fbm(p * 2.0 + 2.0 * q + t * 0.1);

    vec3 col = mix(vec3(0.04, 0.02, 0.10), vec3(0.62, 0.10, 0.45), f);
    col = mix(col, vec3(0.10, 0.35, 0.75), clamp(q.x * q.y * 2.0, 0.0, 1.0));
    col *= smoothstep(1.4, 0.2, length(p));
    col = hueShiftRGB(col, uHueShift);

    float scanline = sin(gl_FragCoord.y * uScanFreq) * 0.5 + 0.5;
    col *= 1.0 - scanline * scanline * uScan;
    col += (hash(gl_FragCoord.xy + uTime) - 0.5) * uNoise;

    fragColor = vec4(clamp(col, 0.0, 1.0), 1.0);
}
";

/// Clip-space corners of a triangle that covers the whole viewport.
pub const FULLSCREEN_TRIANGLE: [f32; 6] = [-1.0, -1.0, 3.0, -1.0, -1.0, 3.0];
