use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    window, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject, WebglLoseContext,
};

use crate::background::{
    canvas_size, FrameClock, FrameUniforms, VeilConfig, FRAGMENT_SHADER, FULLSCREEN_TRIANGLE,
    VERTEX_SHADER,
};
use crate::error::PageError;

fn unavailable(msg: impl Into<String>) -> PageError {
    PageError::RenderingUnavailable(msg.into())
}

struct Uniforms {
    time: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    hue_shift: Option<WebGlUniformLocation>,
    noise: Option<WebGlUniformLocation>,
    scan: Option<WebGlUniformLocation>,
    scan_freq: Option<WebGlUniformLocation>,
    warp: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        let at = |name| gl.get_uniform_location(program, name);
        Self {
            time: at("uTime"),
            resolution: at("uResolution"),
            hue_shift: at("uHueShift"),
            noise: at("uNoise"),
            scan: at("uScan"),
            scan_freq: at("uScanFreq"),
            warp: at("uWarp"),
        }
    }
}

/// GL objects owned by the background. Released explicitly on teardown.
struct Veil {
    gl: GL,
    program: WebGlProgram,
    buffer: WebGlBuffer,
    vao: WebGlVertexArrayObject,
    uniforms: Uniforms,
}

impl Veil {
    fn new(canvas: &HtmlCanvasElement) -> Result<Self, PageError> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|_| unavailable("getContext threw"))?
            .ok_or_else(|| unavailable("WebGL2 not supported"))?
            .dyn_into()
            .map_err(|_| unavailable("context is not WebGL2"))?;

        let vs = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let fs = compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vs, &fs)?;
        // The program keeps what it needs once linked.
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));

        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| unavailable("createVertexArray failed"))?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = gl
            .create_buffer()
            .ok_or_else(|| unavailable("createBuffer failed"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let vertices = js_sys::Float32Array::from(&FULLSCREEN_TRIANGLE[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 2, GL::FLOAT, false, 0, 0);
        gl.bind_vertex_array(None);

        let uniforms = Uniforms::locate(&gl, &program);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);

        Ok(Self {
            gl,
            program,
            buffer,
            vao,
            uniforms,
        })
    }

    fn draw(&self, u: &FrameUniforms) {
        let gl = &self.gl;
        let (w, h) = u.resolution;
        gl.viewport(0, 0, w as i32, h as i32);
        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));

        let loc = &self.uniforms;
        gl.uniform1f(loc.time.as_ref(), u.time);
        gl.uniform2f(loc.resolution.as_ref(), w, h);
        gl.uniform1f(loc.hue_shift.as_ref(), u.hue_shift);
        gl.uniform1f(loc.noise.as_ref(), u.noise);
        gl.uniform1f(loc.scan.as_ref(), u.scan);
        gl.uniform1f(loc.scan_freq.as_ref(), u.scan_freq);
        gl.uniform1f(loc.warp.as_ref(), u.warp);

        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);
    }

    fn release(self) {
        let gl = &self.gl;
        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);
        gl.use_program(None);
        gl.delete_vertex_array(Some(&self.vao));
        gl.delete_buffer(Some(&self.buffer));
        gl.delete_program(Some(&self.program));

        match gl.get_extension("WEBGL_lose_context") {
            Ok(Some(ext)) => ext.unchecked_into::<WebglLoseContext>().lose_context(),
            _ => log::debug!("WEBGL_lose_context unavailable; context left to the GC"),
        }
    }
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, PageError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| unavailable("createShader failed"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(unavailable(format!("shader compile failed: {info}")))
    }
}

fn link_program(gl: &GL, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram, PageError> {
    let program = gl
        .create_program()
        .ok_or_else(|| unavailable("createProgram failed"))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(unavailable(format!("program link failed: {info}")))
    }
}

/// Shared state of one mounted background. The JS callbacks hold only weak
/// references, so dropping the handle is enough to free everything.
struct FrameLoop {
    canvas: HtmlCanvasElement,
    config: Rc<RefCell<VeilConfig>>,
    veil: RefCell<Option<Veil>>,
    clock: RefCell<FrameClock>,
    running: Cell<bool>,
    pending_frame: Cell<Option<i32>>,
    frames: Rc<Cell<u64>>,
    on_frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    on_resize: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl FrameLoop {
    fn resize(&self) {
        let Some(win) = window() else { return };
        let viewport = (
            win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
            win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        );
        let scale = self.config.borrow().resolution_scale;
        let (w, h) = canvas_size(viewport, win.device_pixel_ratio(), scale);
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
    }

    fn schedule(&self) {
        let Some(win) = window() else { return };
        let on_frame = self.on_frame.borrow();
        let Some(cb) = on_frame.as_ref() else { return };
        match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.pending_frame.set(Some(id)),
            Err(err) => log::warn!("requestAnimationFrame failed: {err:?}"),
        }
    }

    fn frame(&self, timestamp_ms: f64) {
        self.pending_frame.set(None);
        if !self.running.get() {
            return;
        }
        // Read live each frame so hue and interaction changes land immediately.
        let config = self.config.borrow().clone();
        let uniforms = {
            let mut clock = self.clock.borrow_mut();
            clock.tick(timestamp_ms, &config);
            clock.uniforms(&config, (self.canvas.width(), self.canvas.height()))
        };
        if let Some(veil) = self.veil.borrow().as_ref() {
            veil.draw(&uniforms);
        }
        self.frames.set(self.frames.get() + 1);
        self.schedule();
    }

    fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let Some(win) = window() {
            if let Some(id) = self.pending_frame.take() {
                let _ = win.cancel_animation_frame(id);
            }
            if let Some(cb) = self.on_resize.borrow().as_ref() {
                let _ = win
                    .remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
            }
        }
        self.on_frame.borrow_mut().take();
        self.on_resize.borrow_mut().take();
        if let Some(veil) = self.veil.borrow_mut().take() {
            veil.release();
        }
        log::debug!("background stopped after {} frames", self.frames.get());
    }
}

/// Owner of a running background. Dropping it stops the frame loop and
/// releases the GL context.
pub struct BackgroundHandle {
    inner: Rc<FrameLoop>,
}

impl BackgroundHandle {
    pub fn frames(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Frame counter that stays readable after the handle is gone.
    pub fn frame_counter(&self) -> Rc<Cell<u64>> {
        Rc::clone(&self.inner.frames)
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn stop(&self) {
        self.inner.stop();
    }
}

impl Drop for BackgroundHandle {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

/// Start the render loop on `canvas`, reading `config` every frame.
pub fn start(
    canvas: HtmlCanvasElement,
    config: Rc<RefCell<VeilConfig>>,
) -> Result<BackgroundHandle, PageError> {
    let win = window().ok_or_else(|| unavailable("no window"))?;
    let veil = Veil::new(&canvas)?;

    let inner = Rc::new(FrameLoop {
        canvas,
        config,
        veil: RefCell::new(Some(veil)),
        clock: RefCell::new(FrameClock::new()),
        running: Cell::new(true),
        pending_frame: Cell::new(None),
        frames: Rc::new(Cell::new(0)),
        on_frame: RefCell::new(None),
        on_resize: RefCell::new(None),
    });

    // Resize canvas to fit window
    let weak: Weak<FrameLoop> = Rc::downgrade(&inner);
    let on_resize = Closure::wrap(Box::new(move || {
        if let Some(inner) = weak.upgrade() {
            inner.resize();
        }
    }) as Box<dyn FnMut()>);
    if win
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .is_err()
    {
        inner.stop();
        return Err(unavailable("could not watch resize"));
    }
    *inner.on_resize.borrow_mut() = Some(on_resize);
    inner.resize();

    let weak = Rc::downgrade(&inner);
    *inner.on_frame.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
        if let Some(inner) = weak.upgrade() {
            inner.frame(timestamp_ms);
        }
    }) as Box<dyn FnMut(f64)>));
    inner.schedule();

    log::info!(
        "background running at {}x{}",
        inner.canvas.width(),
        inner.canvas.height()
    );
    Ok(BackgroundHandle { inner })
}
