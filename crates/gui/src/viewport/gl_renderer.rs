use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glow::HasContext;

use super::mesh::{MeshData, STRIDE};
use customizer_gui_lib::scene::backend::{
    FrameSnapshot, Light, Material, MaterialHandle, MeshHandle, RenderBackend,
};

/// Directional lights beyond this count are ignored by the shader
const MAX_LIGHTS: usize = 4;

// ── Command queue ────────────────────────────────────────────

enum MeshCommand {
    Upload(MeshHandle, MeshData),
    Release(MeshHandle),
}

/// Work recorded by [`GlBackend`] and consumed by [`GlRenderer`] inside the
/// paint callback, where a GL context is available.
#[derive(Default)]
pub struct GlQueue {
    commands: Vec<MeshCommand>,
    materials: HashMap<MaterialHandle, Material>,
    frame: Option<FrameSnapshot>,
    surface: Option<(u32, u32)>,
}

impl GlQueue {
    /// Drop queued mesh work. Used when no GL context exists to consume it.
    pub fn discard_commands(&mut self) {
        self.commands.clear();
    }
}

pub type SharedQueue = Arc<Mutex<GlQueue>>;

/// Render backend that records scene changes for the GL paint callback
pub struct GlBackend {
    queue: SharedQueue,
}

impl GlBackend {
    pub fn new(queue: SharedQueue) -> Self {
        Self { queue }
    }

    fn with_queue(&self, f: impl FnOnce(&mut GlQueue)) {
        match self.queue.lock() {
            Ok(mut queue) => f(&mut queue),
            Err(_) => tracing::error!("GL command queue poisoned"),
        }
    }
}

impl RenderBackend for GlBackend {
    fn create_surface(&mut self, width: u32, height: u32) {
        self.with_queue(|q| q.surface = Some((width, height)));
    }

    fn release_surface(&mut self) {
        self.with_queue(|q| {
            q.surface = None;
            q.frame = None;
        });
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.with_queue(|q| {
            if q.surface.is_some() {
                q.surface = Some((width, height));
            }
        });
    }

    fn upload_mesh(&mut self, handle: MeshHandle, mesh: &MeshData) {
        let mesh = mesh.clone();
        self.with_queue(|q| q.commands.push(MeshCommand::Upload(handle, mesh)));
    }

    fn release_mesh(&mut self, handle: MeshHandle) {
        self.with_queue(|q| q.commands.push(MeshCommand::Release(handle)));
    }

    fn create_material(&mut self, handle: MaterialHandle, material: &Material) {
        self.with_queue(|q| {
            q.materials.insert(handle, *material);
        });
    }

    fn update_material(&mut self, handle: MaterialHandle, material: &Material) {
        self.create_material(handle, material);
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        self.with_queue(|q| {
            q.materials.remove(&handle);
        });
    }

    fn draw(&mut self, frame: &FrameSnapshot) {
        let frame = frame.clone();
        self.with_queue(|q| q.frame = Some(frame));
    }
}

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    program: glow::Program,
    meshes: HashMap<MeshHandle, GpuMesh>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        Ok(Self {
            program,
            meshes: HashMap::new(),
        })
    }

    /// Apply queued uploads and releases in the order they were recorded
    fn apply_commands(&mut self, gl: &glow::Context, queue: &mut GlQueue) {
        for command in queue.commands.drain(..) {
            match command {
                MeshCommand::Upload(handle, data) => match upload_mesh(gl, &data) {
                    Ok(gpu) => {
                        if let Some(old) = self.meshes.insert(handle, gpu) {
                            delete_mesh(gl, &old);
                        }
                    }
                    Err(e) => tracing::error!(mesh = handle.0, "Mesh upload failed: {e}"),
                },
                MeshCommand::Release(handle) => {
                    if let Some(gpu) = self.meshes.remove(&handle) {
                        delete_mesh(gl, &gpu);
                    }
                }
            }
        }
    }

    /// Consume the queue and draw its latest frame into `viewport`
    /// (`[x, y, width, height]` in pixels, origin bottom-left).
    pub fn paint(&mut self, gl: &glow::Context, viewport: [i32; 4], queue: &mut GlQueue) {
        self.apply_commands(gl, queue);
        if queue.surface.is_none() {
            return;
        }
        let Some(frame) = queue.frame.as_ref() else {
            return;
        };
        let view_proj = frame.projection * frame.view;
        let [x, y, w, h] = viewport;

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            let [r, g, b] = frame.clear_color;
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.depth_mask(true);
            gl.disable(glow::CULL_FACE);

            gl.use_program(Some(self.program));
            set_lights(gl, self.program, &frame.lights);

            for item in &frame.items {
                let (Some(mesh), Some(material)) =
                    (self.meshes.get(&item.mesh), queue.materials.get(&item.material))
                else {
                    continue;
                };
                let mvp = view_proj * item.model;
                set_uniform_mat4(gl, self.program, "u_mvp", &mvp);
                set_uniform_mat4(gl, self.program, "u_model", &item.model);
                set_uniform_vec3(gl, self.program, "u_color", material.color);

                match material.polygon_offset {
                    Some((factor, units)) => {
                        gl.enable(glow::POLYGON_OFFSET_FILL);
                        gl.polygon_offset(factor, units);
                    }
                    None => gl.disable(glow::POLYGON_OFFSET_FILL),
                }
                draw_mesh(gl, mesh);
            }

            gl.disable(glow::POLYGON_OFFSET_FILL);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        for (_, mesh) in self.meshes.drain() {
            delete_mesh(gl, &mesh);
        }
        unsafe {
            gl.delete_program(self.program);
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            as_bytes(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            as_bytes(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_shader(gl: &glow::Context, kind: u32, src: &str) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl.create_shader(kind)?;
        gl.shader_source(shader, src);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(format!("shader compile error: {log}"));
        }
        Ok(shader)
    }
}

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let vert = compile_shader(gl, glow::VERTEX_SHADER, vert_src)?;
        let frag = match compile_shader(gl, glow::FRAGMENT_SHADER, frag_src) {
            Ok(frag) => frag,
            Err(e) => {
                gl.delete_shader(vert);
                return Err(e);
            }
        };

        let program = gl.create_program()?;
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(format!("program link error: {log}"));
        }
        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: [f32; 3]) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v[0], v[1], v[2]);
    }
}

fn set_lights(gl: &glow::Context, program: glow::Program, lights: &[Light]) {
    let mut ambient = [0.0f32; 3];
    let mut count = 0;
    for light in lights {
        match *light {
            Light::Ambient { color, intensity } => {
                for (acc, c) in ambient.iter_mut().zip(color) {
                    *acc += c * intensity;
                }
            }
            Light::Directional {
                color,
                intensity,
                position,
            } => {
                if count == MAX_LIGHTS {
                    continue;
                }
                let dir = position.normalize_or_zero();
                set_uniform_vec3(gl, program, &format!("u_light_dir[{count}]"), dir.to_array());
                set_uniform_vec3(
                    gl,
                    program,
                    &format!("u_light_color[{count}]"),
                    color.map(|c| c * intensity),
                );
                count += 1;
            }
        }
    }
    set_uniform_vec3(gl, program, "u_ambient", ambient);
    unsafe {
        let loc = gl.get_uniform_location(program, "u_light_count");
        gl.uniform_1_i32(loc.as_ref(), count as i32);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn as_bytes<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;
uniform mat4 u_model;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

out vec3 v_normal;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = mat3(transpose(inverse(u_model))) * a_normal;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
#define MAX_LIGHTS 4
const float PI = 3.14159265;

uniform vec3 u_color;
uniform vec3 u_ambient;
uniform int u_light_count;
uniform vec3 u_light_dir[MAX_LIGHTS];
uniform vec3 u_light_color[MAX_LIGHTS];

in vec3 v_normal;
out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    if (!gl_FrontFacing) {
        n = -n;
    }
    vec3 irradiance = u_ambient;
    for (int i = 0; i < u_light_count; i++) {
        irradiance += u_light_color[i] * max(dot(n, u_light_dir[i]), 0.0);
    }
    vec3 albedo = pow(u_color, vec3(2.2));
    vec3 color = albedo * irradiance / PI;
    frag_color = vec4(pow(clamp(color, 0.0, 1.0), vec3(1.0 / 2.2)), 1.0);
}
"#;
