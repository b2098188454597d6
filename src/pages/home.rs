use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_query_map;
use log::{debug, info, warn};

use crate::components::graph_canvas::{GraphCanvas, GraphLayout};
use crate::config::{ConfigError, ExplorerConfig};
use crate::provenance::{Category, HttpLinkSource, build_layout, central_node, fetch_all_links};

/// Id of the optional `<script type="application/json">` holding deployment config.
const CONFIG_ELEMENT_ID: &str = "explorer-config";

/// Configuration embedded in the page, or the defaults when there is none.
fn embedded_config() -> Result<ExplorerConfig, ConfigError> {
	let json = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
		.and_then(|el| el.text_content());
	match json {
		Some(json) => {
			debug!("using embedded configuration");
			ExplorerConfig::from_json(&json)
		}
		None => Ok(ExplorerConfig::default()),
	}
}

/// Fetches the subject's links once and draws them around it.
#[component]
fn ProvenanceExplorer(config: ExplorerConfig) -> impl IntoView {
	let central = central_node(&config);
	let subject = config.subject_uuid.clone();
	let (layout, set_layout) = signal(GraphLayout {
		nodes: vec![central.clone()],
		edges: Vec::new(),
	});
	let (failed, set_failed) = signal(Vec::<Category>::new());
	let (loading, set_loading) = signal(true);

	spawn_local(async move {
		let source = HttpLinkSource::new(&config);
		let partial = fetch_all_links(&source, &config).await.into_partial();
		let next = build_layout(&partial.bundle, &central, &config.origins);
		match serde_json::to_string(&next) {
			Ok(json) => debug!("layout {}", json),
			Err(e) => warn!("layout not serialisable: {}", e),
		}
		info!(
			"{}: {} nodes, {} edges, {} failed categories",
			config.subject_uuid,
			next.nodes.len(),
			next.edges.len(),
			partial.failed.len()
		);

		// The page may have been torn down while the requests were in flight.
		if set_layout.try_set(next).is_some() {
			debug!("explorer disposed before links arrived");
			return;
		}
		set_failed.try_set(partial.failed);
		set_loading.try_set(false);
	});

	let failed_list = move || {
		failed
			.get()
			.iter()
			.map(Category::to_string)
			.collect::<Vec<_>>()
			.join(", ")
	};

	view! {
		<div class="fullscreen-graph">
			<GraphCanvas layout=layout fullscreen=true />
			<div class="graph-overlay">
				<h1>"Provenance Graph"</h1>
				<p class="subtitle">{subject}</p>
				<Show when=move || loading.get()>
					<p class="status">"Loading links…"</p>
				</Show>
				<Show when=move || !failed.get().is_empty()>
					<p class="status degraded">"Could not load " {failed_list}</p>
				</Show>
			</div>
		</div>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let query = use_query_map();
	let config = embedded_config()
		.and_then(|config| query.with_untracked(|q| config.with_overrides(|key| q.get(key))));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{config.map(|config| view! { <ProvenanceExplorer config=config /> })}
		</ErrorBoundary>
	}
}
