use shared::ClassificationResult;
use shared::render::{ChartSegment, ClassificationView, ProbabilityBar};
use yew::prelude::*;

// Radius giving a circumference of 100, so dash lengths read as percentages.
const DONUT_RADIUS: &str = "15.91549430918954";

pub fn render_classification(result: &ClassificationResult, analyzed_filename: &str) -> Html {
    let view = ClassificationView::from_result(result);
    let raw_json = serde_json::to_string_pretty(&result.raw).unwrap_or_default();

    html! {
        <div class="results-container">
            <div class="result-header">
                <h2 title={format!("Analysis results for: {}", analyzed_filename)}>
                    <i class={view.style.icon} style={format!("color: {}", view.style.color)}></i>
                    { format!(" {}", view.display_label) }
                    <span class="analyzed-filename-display">{ format!("({})", analyzed_filename) }</span>
                </h2>
                <div class="confidence-meter">
                    <div class="meter">
                        <div class="meter-fill"
                            style={format!("width: {}%; background-color: {}", (result.confidence * 100.0).clamp(0.0, 100.0), view.style.color)}>
                        </div>
                    </div>
                    <div class="meter-value">{ &view.confidence_text }</div>
                </div>
            </div>
            <div class="detailed-results">
                <h3>{"Detailed Analysis"}</h3>
                <div class="result-body">
                    <div class="result-bars">
                        { for view.bars.iter().map(render_bar) }
                    </div>
                    { render_donut(&view.chart) }
                </div>
            </div>
            <details class="raw-response">
                <summary>{"Raw JSON response"}</summary>
                <pre>{ raw_json }</pre>
            </details>
        </div>
    }
}

fn render_bar(bar: &ProbabilityBar) -> Html {
    html! {
        <div class="result-item" key={bar.class_name.clone()}>
            <div class="result-label">
                <i class={bar.style.icon} style={format!("color: {}", bar.style.color)}></i>
                { format!(" {}", bar.display_name) }
            </div>
            <div class="result-bar-container">
                <div class="result-bar"
                    style={format!("width: {}%; background-color: {}", bar.width, bar.style.color)}>
                </div>
            </div>
            <div class="result-value">{ &bar.percent_text }</div>
        </div>
    }
}

fn render_donut(chart: &[ChartSegment]) -> Html {
    if chart.is_empty() {
        return html! {};
    }

    html! {
        <svg class="donut-chart" viewBox="0 0 42 42" role="img" aria-label="Class probability chart">
            <circle class="donut-ring" cx="21" cy="21" r={DONUT_RADIUS}
                fill="transparent" stroke="#e0e0e0" stroke-width="5" />
            { for chart.iter().map(|segment| {
                let length = segment.fraction * 100.0;
                html! {
                    <circle
                        class="donut-segment"
                        cx="21" cy="21" r={DONUT_RADIUS}
                        fill="transparent"
                        stroke={segment.color}
                        stroke-width="5"
                        stroke-dasharray={format!("{} {}", length, 100.0 - length)}
                        stroke-dashoffset={format!("{}", 25.0 - segment.offset * 100.0)}
                    >
                        <title>{ format!("{}: {:.1}%", segment.class_name, length) }</title>
                    </circle>
                }
            }) }
        </svg>
    }
}

pub fn render_summary(summary: &str) -> Html {
    html! {
        <div class="results-container summary">
            <h3>{"Text Summary"}</h3>
            <pre class="summary-text">{ summary }</pre>
        </div>
    }
}
