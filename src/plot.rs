// plot.rs

use crate::coords::CoordinateData;
use crate::metadata::MetadataTable;
use crate::prefs::Preferences;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use plotters::prelude::*;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Possibly universal constants.
const PLOT_WIDTH: u32 = 480;
const PLOT_HEIGHT: u32 = 400;
const MARGIN: i32 = 15;
const FONT: &str = "sans-serif";
const TITLE_FONT_SIZE: i32 = 16;
const TICK_FONT_SIZE: i32 = 11;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 55;
const AXIS_TICS: usize = 5;
const POINT_SIZE: i32 = 4;
const HOVER_RADIUS: i32 = POINT_SIZE + 2;
const RANGE_PAD: f64 = 0.05;
const MAX_PLOTTED_AXES: usize = 3;

const PALETTE: [(&str, RGBColor); 14] = [
    ("red", RGBColor(255, 0, 0)),
    ("blue", RGBColor(0, 0, 255)),
    ("green", RGBColor(0, 128, 0)),
    ("orange", RGBColor(255, 165, 0)),
    ("purple", RGBColor(128, 0, 128)),
    ("teal", RGBColor(0, 128, 128)),
    ("maroon", RGBColor(128, 0, 0)),
    ("navy", RGBColor(0, 0, 128)),
    ("olive", RGBColor(128, 128, 0)),
    ("fuchsia", RGBColor(255, 0, 255)),
    ("aqua", RGBColor(0, 255, 255)),
    ("lime", RGBColor(0, 255, 0)),
    ("gray", RGBColor(128, 128, 128)),
    ("black", RGBColor(0, 0, 0)),
];

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("at least 2 ordination axes are needed for 2D plots, found {0}")]
    TooFewAxes(usize),

    #[error("no sample appears in both the coordinates and the mapping data")]
    NoSharedSamples,

    #[error("preference '{label}' refers to missing column '{column}'")]
    UnknownColumn { label: String, column: String },

    #[error("coordinates on {0} span a range too wide to plot")]
    AxisOverflow(String),

    #[error("failed to draw plot: {0}")]
    Draw(String),

    #[error("failed to format HTML: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn draw_err(e: impl std::fmt::Display) -> PlotError {
    PlotError::Draw(e.to_string())
}

fn write_file(path: &Path, contents: &str) -> Result<(), PlotError> {
    fs::write(path, contents).map_err(|source| PlotError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything the renderer reads. Nothing here is modified.
pub struct PlotRequest<'a> {
    pub prefs: &'a Preferences,
    pub table: &'a MetadataTable,
    pub coords: &'a CoordinateData,
    pub output_dir: &'a Path,
    pub coord_file_name: &'a str,
}

#[derive(Debug)]
pub struct RenderSummary {
    pub index_path: PathBuf,
    pub image_paths: Vec<PathBuf>,
    pub plotted_samples: usize,
}

struct PlotGroup {
    value: String,
    color_name: &'static str,
    color: RGBColor,
    // (sample id, row in the coordinate matrix)
    samples: Vec<(String, usize)>,
}

struct CategoryJob<'a> {
    label: &'a str,
    column: &'a str,
    file_stem: String,
}

struct PointArea {
    x: i32,
    y: i32,
    tooltip: String,
}

struct RenderedImage {
    file_name: String,
    x_axis: usize,
    y_axis: usize,
    areas: Vec<PointArea>,
}

struct RenderedCategory {
    label: String,
    column: String,
    groups: Vec<PlotGroup>,
    images: Vec<RenderedImage>,
}

/// Pairs of axes (0-based) to plot: every pair among the first three axes.
pub fn axis_pairs(num_axes: usize) -> Vec<(usize, usize)> {
    let n = num_axes.min(MAX_PLOTTED_AXES);
    let mut pairs = Vec::new();
    for x in 0..n {
        for y in (x + 1)..n {
            pairs.push((x, y));
        }
    }
    pairs
}

/// Keeps ASCII letters, digits, '-' and '_'; everything else becomes '_'.
pub fn sanitize_file_component(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// For text placed inside a single-quoted JS string literal.
fn escape_js_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

fn color_hex(color: &RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

fn axis_label(coords: &CoordinateData, axis: usize) -> String {
    match coords.pct_explained.get(axis) {
        Some(pct) => format!("PC{} ({:.2}%)", axis + 1, pct),
        None => format!("PC{}", axis + 1),
    }
}

/// Axis range covering `values` with a small margin. `None` when the padded
/// range is wider than an `f64` can represent.
fn padded_range(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !low.is_finite() || !high.is_finite() {
        return Some(-1.0..1.0);
    }
    let span = high - low;
    let pad = if span > 0.0 { span * RANGE_PAD } else { 1.0 };
    let (start, end) = (low - pad, high + pad);
    if (end - start).is_finite() {
        Some(start..end)
    } else {
        None
    }
}

fn build_groups(
    table: &MetadataTable,
    coords: &CoordinateData,
    coord_rows: &HashMap<&str, usize>,
    label: &str,
    column: &str,
) -> Result<Vec<PlotGroup>, PlotError> {
    let grouped = table
        .group_by_column(column)
        .ok_or_else(|| PlotError::UnknownColumn {
            label: label.to_string(),
            column: column.to_string(),
        })?;

    let mut groups = Vec::with_capacity(grouped.len());
    for (value, sample_ids) in grouped {
        let samples: Vec<(String, usize)> = sample_ids
            .into_iter()
            .filter_map(|id| coord_rows.get(id.as_str()).map(|&row| (id, row)))
            .collect();
        if samples.is_empty() {
            debug!(
                "Group '{}' of '{}' has no samples in the coordinates, skipping.",
                value, label
            );
            continue;
        }
        let (color_name, color) = PALETTE[groups.len() % PALETTE.len()];
        groups.push(PlotGroup {
            value,
            color_name,
            color,
            samples,
        });
    }
    if groups.len() > PALETTE.len() {
        warn!(
            "'{}' has {} groups but only {} colors; colors will repeat.",
            label,
            groups.len(),
            PALETTE.len()
        );
    }
    debug!(
        "'{}' split into {} groups over {} axes.",
        label,
        groups.len(),
        coords.num_axes()
    );
    Ok(groups)
}

fn render_scatter(
    groups: &[PlotGroup],
    coords: &CoordinateData,
    label: &str,
    (x_axis, y_axis): (usize, usize),
) -> Result<(String, Vec<PointArea>), PlotError> {
    let points = groups
        .iter()
        .flat_map(|g| g.samples.iter())
        .map(|&(_, row)| (coords.coords[[row, x_axis]], coords.coords[[row, y_axis]]));
    let x_desc = axis_label(coords, x_axis);
    let y_desc = axis_label(coords, y_axis);
    let x_range = padded_range(points.clone().map(|(x, _)| x))
        .ok_or_else(|| PlotError::AxisOverflow(format!("PC{}", x_axis + 1)))?;
    let y_range = padded_range(points.map(|(_, y)| y))
        .ok_or_else(|| PlotError::AxisOverflow(format!("PC{}", y_axis + 1)))?;
    let title = format!("{}: {} vs {}", label, x_desc, y_desc);

    let mut svg = String::new();
    let mut areas = Vec::new();
    {
        let root = SVGBackend::with_string(&mut svg, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let root = root.margin(MARGIN, MARGIN, MARGIN, MARGIN);
        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, TITLE_FONT_SIZE).into_font())
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;
        chart
            .configure_mesh()
            .label_style((FONT, TICK_FONT_SIZE).into_font())
            .x_labels(AXIS_TICS)
            .y_labels(AXIS_TICS)
            .x_desc(x_desc.as_str())
            .y_desc(y_desc.as_str())
            .draw()
            .map_err(draw_err)?;

        for group in groups {
            let group_points: Vec<(f64, f64)> = group
                .samples
                .iter()
                .map(|&(_, row)| (coords.coords[[row, x_axis]], coords.coords[[row, y_axis]]))
                .collect();
            chart
                .draw_series(PointSeries::of_element(
                    group_points.clone(),
                    POINT_SIZE,
                    &group.color,
                    &|c, s, st| EmptyElement::at(c) + Circle::new((0, 0), s, st.filled()),
                ))
                .map_err(draw_err)?;

            for ((sample_id, _), point) in group.samples.iter().zip(&group_points) {
                let (x, y) = chart.backend_coord(point);
                areas.push(PointArea {
                    x,
                    y,
                    tooltip: format!("{} ({}: {})", sample_id, label, group.value),
                });
            }
        }
        root.present().map_err(draw_err)?;
    }
    Ok((svg, areas))
}

fn render_category(
    request: &PlotRequest<'_>,
    coord_rows: &HashMap<&str, usize>,
    pairs: &[(usize, usize)],
    job: &CategoryJob<'_>,
) -> Result<RenderedCategory, PlotError> {
    let groups = build_groups(
        request.table,
        request.coords,
        coord_rows,
        job.label,
        job.column,
    )?;

    let mut images = Vec::with_capacity(pairs.len());
    for &(x_axis, y_axis) in pairs {
        let (svg, areas) = render_scatter(&groups, request.coords, job.label, (x_axis, y_axis))?;
        let file_name = format!("{}_PC{}_PC{}.svg", job.file_stem, x_axis + 1, y_axis + 1);
        write_file(&request.output_dir.join(&file_name), &svg)?;
        debug!("Wrote {}", file_name);
        images.push(RenderedImage {
            file_name,
            x_axis,
            y_axis,
            areas,
        });
    }

    Ok(RenderedCategory {
        label: job.label.to_string(),
        column: job.column.to_string(),
        groups,
        images,
    })
}

fn write_index_html(
    request: &PlotRequest<'_>,
    categories: &[RenderedCategory],
    plotted_samples: usize,
) -> Result<String, PlotError> {
    let coords = request.coords;
    let mut html = String::with_capacity(16 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<title>2D PCoA plots: {}</title>",
        escape_html(request.coord_file_name)
    )?;
    writeln!(
        html,
        "<script type=\"text/javascript\" src=\"js/overlib.js\"></script>"
    )?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;}}"
    )?;
    writeln!(html, ".meta{{color:#555;font-size:13px;}}")?;
    writeln!(
        html,
        "table{{border-collapse:collapse;margin:8px 0 12px 0;}} th,td{{border:1px solid #ddd;padding:3px 8px;text-align:left;}}"
    )?;
    writeln!(
        html,
        ".swatch{{display:inline-block;width:12px;height:12px;border:1px solid #444;}}"
    )?;
    writeln!(html, ".plots img{{margin:4px;border:1px solid #eee;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(
        html,
        "<div id=\"overDiv\" style=\"position:absolute;visibility:hidden;z-index:1000;\"></div>"
    )?;
    writeln!(html, "<h1>2D PCoA plots</h1>")?;
    writeln!(
        html,
        "<p class=\"meta\">Coordinates: {} &middot; {} samples plotted</p>",
        escape_html(request.coord_file_name),
        plotted_samples
    )?;

    if !coords.eigenvalues.is_empty() || !coords.pct_explained.is_empty() {
        writeln!(html, "<table class=\"axes\">")?;
        writeln!(
            html,
            "<tr><th>Axis</th><th>Eigenvalue</th><th>% variation explained</th></tr>"
        )?;
        let fmt_opt =
            |value: Option<&f64>| value.map_or_else(|| "NA".to_string(), |v| format!("{:.4}", v));
        for axis in 0..coords.num_axes().min(MAX_PLOTTED_AXES) {
            writeln!(
                html,
                "<tr><td>PC{}</td><td>{}</td><td>{}</td></tr>",
                axis + 1,
                fmt_opt(coords.eigenvalues.get(axis)),
                fmt_opt(coords.pct_explained.get(axis))
            )?;
        }
        writeln!(html, "</table>")?;
    }

    for (cat_idx, category) in categories.iter().enumerate() {
        writeln!(html, "<h2>Colored by: {}</h2>", escape_html(&category.label))?;
        writeln!(
            html,
            "<p class=\"meta\">Mapping column: {}</p>",
            escape_html(&category.column)
        )?;

        writeln!(html, "<table class=\"legend\">")?;
        writeln!(html, "<tr><th>Color</th><th>Value</th><th>Samples</th></tr>")?;
        for group in &category.groups {
            writeln!(
                html,
                "<tr><td><span class=\"swatch\" style=\"background:{}\" title=\"{}\"></span></td><td>{}</td><td>{}</td></tr>",
                color_hex(&group.color),
                group.color_name,
                escape_html(&group.value),
                group.samples.len()
            )?;
        }
        writeln!(html, "</table>")?;

        writeln!(html, "<div class=\"plots\">")?;
        for image in &category.images {
            let map_name = format!("map_{}_{}_{}", cat_idx, image.x_axis + 1, image.y_axis + 1);
            writeln!(
                html,
                "<img src=\"{}\" usemap=\"#{}\" width=\"{}\" height=\"{}\" alt=\"{}: PC{} vs PC{}\"/>",
                escape_html(&image.file_name),
                map_name,
                PLOT_WIDTH,
                PLOT_HEIGHT,
                escape_html(&category.label),
                image.x_axis + 1,
                image.y_axis + 1
            )?;
            writeln!(html, "<map name=\"{}\">", map_name)?;
            for area in &image.areas {
                writeln!(
                    html,
                    "<area shape=\"circle\" coords=\"{},{},{}\" href=\"#\" onmouseover=\"return overlib('{}');\" onmouseout=\"return nd();\"/>",
                    area.x,
                    area.y,
                    HOVER_RADIUS,
                    escape_html(&escape_js_string(&area.tooltip))
                )?;
            }
            writeln!(html, "</map>")?;
        }
        writeln!(html, "</div>")?;
    }

    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

/// Draws every preference entry against every axis pair and writes the SVG
/// images plus an HTML index into `request.output_dir`.
pub fn render_plots(
    request: &PlotRequest<'_>,
    progress: &ProgressBar,
) -> Result<RenderSummary, PlotError> {
    let coords = request.coords;
    let pairs = axis_pairs(coords.num_axes());
    if pairs.is_empty() {
        return Err(PlotError::TooFewAxes(coords.num_axes()));
    }

    // Reconcile samples: only those in both inputs are drawn.
    let mapped: HashSet<&str> = request.table.sample_ids().collect();
    let coord_rows: HashMap<&str, usize> = coords
        .sample_ids
        .iter()
        .enumerate()
        .filter(|(_, id)| mapped.contains(id.as_str()))
        .map(|(row, id)| (id.as_str(), row))
        .collect();
    if coord_rows.is_empty() {
        return Err(PlotError::NoSharedSamples);
    }
    let missing_from_mapping = coords.sample_ids.len() - coord_rows.len();
    if missing_from_mapping > 0 {
        warn!(
            "{} sample(s) in the coordinates are missing from the mapping data and will not be plotted.",
            missing_from_mapping
        );
    }
    let missing_from_coords = mapped.len() - coord_rows.len();
    if missing_from_coords > 0 {
        warn!(
            "{} sample(s) in the mapping data have no coordinates and will not be plotted.",
            missing_from_coords
        );
    }

    let mut used_stems: HashSet<String> = HashSet::new();
    let jobs: Vec<CategoryJob<'_>> = request
        .prefs
        .iter()
        .map(|(label, pref)| {
            let base = format!(
                "{}_{}",
                request.coord_file_name,
                sanitize_file_component(label)
            );
            let mut file_stem = base.clone();
            let mut suffix = 1;
            while !used_stems.insert(file_stem.clone()) {
                file_stem = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            CategoryJob {
                label,
                column: pref.column.as_str(),
                file_stem,
            }
        })
        .collect();

    info!(
        "Rendering {} categor{} on {} axis pair(s)...",
        jobs.len(),
        if jobs.len() == 1 { "y" } else { "ies" },
        pairs.len()
    );
    progress.set_length(jobs.len() as u64);
    let categories: Vec<RenderedCategory> = jobs
        .par_iter()
        .map(|job| {
            let result = render_category(request, &coord_rows, &pairs, job);
            progress.inc(1);
            result
        })
        .collect::<Result<Vec<_>, PlotError>>()?;
    progress.finish_with_message("Plots rendered.");

    let html = write_index_html(request, &categories, coord_rows.len())?;
    let index_path = request
        .output_dir
        .join(format!("{}_2D_PCoA_plots.html", request.coord_file_name));
    write_file(&index_path, &html)?;
    info!("Wrote plot index to {}", index_path.display());

    let image_paths = categories
        .iter()
        .flat_map(|c| c.images.iter())
        .map(|image| request.output_dir.join(&image.file_name))
        .collect();

    Ok(RenderSummary {
        index_path,
        image_paths,
        plotted_samples: coord_rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::resolve_preferences;
    use ndarray::array;
    use rstest::rstest;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn coords_3d() -> CoordinateData {
        CoordinateData {
            sample_ids: strings(&["S1", "S2", "S3", "S4"]),
            coords: array![
                [0.1, -0.2, 0.3],
                [-0.4, 0.5, 0.6],
                [0.7, 0.8, -0.9],
                [0.0, 0.1, 0.2]
            ],
            eigenvalues: vec![4.5, 2.5, 1.0],
            pct_explained: vec![51.6, 28.7, 11.5],
        }
    }

    fn mapping() -> MetadataTable {
        MetadataTable::new(
            strings(&["#SampleID", "Day", "Type"]),
            vec![
                strings(&["S1", "1", "Control"]),
                strings(&["S2", "2", "Fast<er>"]),
                strings(&["S3", "1", "Fast<er>"]),
            ],
        )
        .unwrap()
    }

    #[rstest]
    #[case(1, vec![])]
    #[case(2, vec![(0, 1)])]
    #[case(3, vec![(0, 1), (0, 2), (1, 2)])]
    #[case(8, vec![(0, 1), (0, 2), (1, 2)])]
    fn pairs_cover_the_first_three_axes(#[case] axes: usize, #[case] expected: Vec<(usize, usize)>) {
        assert_eq!(axis_pairs(axes), expected);
    }

    #[rstest]
    #[case("Day", "Day")]
    #[case("Type&&Day", "Type__Day")]
    #[case("a b/c", "a_b_c")]
    fn labels_become_safe_file_names(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_component(label), expected);
    }

    #[test]
    fn html_and_js_text_is_escaped() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape_js_string("it's a\\b"), "it\\'s a\\\\b");
    }

    #[test]
    fn range_is_padded_and_never_empty() {
        let range = padded_range([0.0, 1.0].into_iter()).unwrap();
        assert!(range.start < 0.0 && range.end > 1.0);
        let flat = padded_range([2.0, 2.0].into_iter());
        assert_eq!(flat, Some(1.0..3.0));
        assert_eq!(padded_range(std::iter::empty()), Some(-1.0..1.0));
    }

    #[rstest]
    #[case::wide_but_representable([-1e307, 1e307], true)]
    #[case::span_overflows([-1e308, 1e308], false)]
    #[case::padding_overflows([-f64::MAX, 0.0], false)]
    fn range_wider_than_f64_is_refused(#[case] values: [f64; 2], #[case] fits: bool) {
        let range = padded_range(values.into_iter());
        assert_eq!(range.is_some(), fits, "got {range:?}");
        if let Some(range) = range {
            assert!(range.start.is_finite() && range.end.is_finite());
            assert!((range.end - range.start).is_finite());
        }
    }

    #[test]
    fn overflowing_coordinates_fail_instead_of_drawing() {
        let dir = TempDir::new().unwrap();
        let coords = crate::coords::parse_coords(
            "pc\t1\t2\nS1\t-1e308\t0\nS2\t1e308\t1\n".as_bytes(),
        )
        .unwrap();
        let table = MetadataTable::default_for_samples(&coords.sample_ids).unwrap();
        let (prefs, table) = resolve_preferences(None, table).unwrap();
        let request = PlotRequest {
            prefs: &prefs,
            table: &table,
            coords: &coords,
            output_dir: dir.path(),
            coord_file_name: "c.txt",
        };
        let err = render_plots(&request, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, PlotError::AxisOverflow(ref axis) if axis == "PC1"), "got {err:?}");
    }

    #[test]
    fn renders_one_image_per_category_and_axis_pair() {
        let dir = TempDir::new().unwrap();
        let (prefs, table) = resolve_preferences(Some("Day,Type&&Day"), mapping()).unwrap();
        let coords = coords_3d();
        let request = PlotRequest {
            prefs: &prefs,
            table: &table,
            coords: &coords,
            output_dir: dir.path(),
            coord_file_name: "pcoa.txt",
        };
        let summary = render_plots(&request, &ProgressBar::hidden()).unwrap();

        assert_eq!(summary.image_paths.len(), 6);
        assert_eq!(summary.plotted_samples, 3);
        assert!(dir.path().join("pcoa.txt_Day_PC1_PC2.svg").is_file());
        assert!(dir.path().join("pcoa.txt_Type__Day_PC2_PC3.svg").is_file());
        for path in &summary.image_paths {
            let svg = fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"));
        }

        let html = fs::read_to_string(&summary.index_path).unwrap();
        assert!(summary.index_path.ends_with("pcoa.txt_2D_PCoA_plots.html"));
        assert!(html.contains("src=\"js/overlib.js\""));
        assert!(html.contains("Colored by: Type&amp;&amp;Day"));
        assert!(html.contains("Fast&lt;er&gt;&amp;&amp;2"));
        assert!(!html.contains("Fast<er>"));
        // S4 has no mapping row, so three points per image.
        assert_eq!(html.matches("<area ").count(), 6 * 3);
    }

    #[test]
    fn default_preferences_plot_every_sample() {
        let dir = TempDir::new().unwrap();
        let coords = coords_3d();
        let table = MetadataTable::default_for_samples(&coords.sample_ids).unwrap();
        let (prefs, table) = resolve_preferences(None, table).unwrap();
        let request = PlotRequest {
            prefs: &prefs,
            table: &table,
            coords: &coords,
            output_dir: dir.path(),
            coord_file_name: "pcoa.txt",
        };
        let summary = render_plots(&request, &ProgressBar::hidden()).unwrap();
        assert_eq!(summary.plotted_samples, 4);
        assert_eq!(summary.image_paths.len(), 3);
        assert!(dir.path().join("pcoa.txt_Sample_PC1_PC3.svg").is_file());
    }

    #[test]
    fn single_axis_is_rejected() {
        let dir = TempDir::new().unwrap();
        let coords = CoordinateData {
            sample_ids: strings(&["S1"]),
            coords: array![[0.5]],
            eigenvalues: Vec::new(),
            pct_explained: Vec::new(),
        };
        let table = MetadataTable::default_for_samples(&coords.sample_ids).unwrap();
        let (prefs, table) = resolve_preferences(None, table).unwrap();
        let request = PlotRequest {
            prefs: &prefs,
            table: &table,
            coords: &coords,
            output_dir: dir.path(),
            coord_file_name: "c.txt",
        };
        let err = render_plots(&request, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, PlotError::TooFewAxes(1)));
    }

    #[test]
    fn disjoint_samples_are_rejected() {
        let dir = TempDir::new().unwrap();
        let coords = coords_3d();
        let table = MetadataTable::default_for_samples(&strings(&["X1", "X2"])).unwrap();
        let (prefs, table) = resolve_preferences(None, table).unwrap();
        let request = PlotRequest {
            prefs: &prefs,
            table: &table,
            coords: &coords,
            output_dir: dir.path(),
            coord_file_name: "c.txt",
        };
        let err = render_plots(&request, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, PlotError::NoSharedSamples));
    }
}
