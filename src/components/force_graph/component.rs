//! Leptos component wrapping the interactive graph canvas.
//!
//! Creates an HTML canvas, wires mouse/wheel handlers into the session's
//! interaction controller, and runs a `requestAnimationFrame` loop that
//! ticks the physics and redraws. All state lives in one `GraphSession`
//! behind an `Rc<RefCell<..>>`; handlers and the frame loop share it on the
//! single JS thread.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render::CanvasScene;
use super::state::GraphSession;
use super::types::GraphData;

/// Session plus the retained canvas scene it binds into.
struct GraphContext {
	session: GraphSession,
	scene: CanvasScene,
	last_frame_ms: f64,
}

/// Renders an interactive, growable force-directed graph on a canvas.
///
/// Pass seed data via the reactive `data` signal. Click a node to grow a new
/// one from it, drag nodes to reposition them, drag the background to pan,
/// scroll to zoom, and use the reset button to ease the view back to
/// identity. The component sizes itself to its parent container by default;
/// set `fullscreen = true` to fill the viewport.
#[component]
pub fn SproutGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		*context_init.borrow_mut() = Some(GraphContext {
			session: GraphSession::new(&data.get(), w, h),
			scene: CanvasScene::new(),
			last_frame_ms: js_sys::Date::now(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.session.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let now = js_sys::Date::now();
				// Clamp dt so a background tab does not integrate one huge step.
				let dt = ((now - c.last_frame_ms) / 1000.0).clamp(0.0, 0.05);
				c.last_frame_ms = now;

				c.session.tick(dt);
				c.session.render_frame(&mut c.scene);
				c.scene.draw(
					&ctx,
					c.session.width(),
					c.session.height(),
					&c.session.theme,
				);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let canvas_pos = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = canvas_pos(&ev);
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.session.pointer_down(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = canvas_pos(&ev);
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.session.pointer_move(x, y);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let (x, y) = canvas_pos(&ev);
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.session.pointer_up(x, y);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.session.pointer_leave();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.session.wheel(x, y, ev.delta_y());
		}
	};

	let context_rs = context.clone();
	let on_reset = move |_| {
		if let Some(ref mut c) = *context_rs.borrow_mut() {
			c.session.reset_view();
		}
	};

	view! {
		<div class="sprout-graph">
			<canvas
				node_ref=canvas_ref
				class="sprout-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<button class="sprout-graph-reset" on:click=on_reset>
				"Reset view"
			</button>
		</div>
	}
}
