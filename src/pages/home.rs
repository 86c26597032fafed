use leptos::prelude::*;

use crate::components::integration_graph::{DiagramOptions, IntegrationDiagram, Topology};

const SAMPLE_TOPOLOGY: &str = include_str!("sample_topology.json");

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let options = DiagramOptions {
		title: Some("Integration Map".into()),
		subtitle: Some(
			"Drag systems to reposition. Shift-drag between systems to connect. Scroll to zoom."
				.into(),
		),
		show_export_labels: true,
	};
	let topology = Topology::from_json(SAMPLE_TOPOLOGY);

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

			<div class="fullscreen-graph">
				{topology
					.map(|topology| {
						view! { <IntegrationDiagram topology=topology options=options fullscreen=true /> }
					})}
			</div>
		</ErrorBoundary>
	}
}
