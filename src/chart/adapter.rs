use crate::core::{Palette, RevenueEntry, SeriesPoint, decimal_to_f64};
use crate::error::PageResult;

use super::spec::{
    AnimationOptions, AxisOptions, ChartData, ChartKind, ChartOptions, ChartSpec, ColorValue,
    Dataset, FontOptions, GridOptions, InteractionOptions, LegendOptions, PluginOptions, Scales,
    TickOptions, TooltipOptions, ValueAffixes,
};
use super::theme::ChartTheme;

fn tooltip_options(palette: &Palette, theme: &ChartTheme) -> TooltipOptions {
    TooltipOptions {
        background_color: palette.get(theme.tooltip_background),
        title_color: palette.get(theme.tooltip_text),
        body_color: palette.get(theme.tooltip_text),
        border_color: palette.get(theme.tooltip_border),
        border_width: theme.tooltip_border_width,
        corner_radius: theme.tooltip_corner_radius,
        display_colors: false,
    }
}

fn axis_options(palette: &Palette, theme: &ChartTheme, grid_alpha: u8) -> AxisOptions {
    AxisOptions {
        grid: GridOptions {
            color: palette.get(theme.grid).with_alpha8(grid_alpha),
            draw_border: false,
        },
        ticks: TickOptions {
            color: palette.get(theme.tick),
            font: FontOptions {
                size: theme.tick_font_size,
                weight: theme.tick_font_weight.clone(),
            },
        },
    }
}

/// Market-growth line chart: one label per period, one value per point, in
/// series order.
pub fn time_series_chart(
    series: &[SeriesPoint],
    palette: &Palette,
    theme: &ChartTheme,
) -> PageResult<ChartSpec> {
    let labels = series.iter().map(|point| point.period.to_string()).collect();
    let values = series
        .iter()
        .map(|point| decimal_to_f64(point.value, "series value"))
        .collect::<PageResult<Vec<_>>>()?;

    let affixes = ValueAffixes {
        prefix: theme.value_prefix.clone(),
        suffix: theme.value_suffix.clone(),
    };
    let tooltip_labels = series
        .iter()
        .map(|point| {
            format!(
                "{}: {}",
                theme.series_tooltip_name,
                affixes.format(point.value.normalize())
            )
        })
        .collect();

    let line = palette.get(theme.line);
    let dataset = Dataset {
        label: Some(theme.series_label.clone()),
        data: values,
        border_color: Some(ColorValue::Single(line)),
        background_color: Some(ColorValue::Single(line.with_alpha8(theme.line_fill_alpha))),
        border_width: Some(theme.line_width),
        fill: Some(true),
        tension: Some(theme.line_tension),
        point_background_color: Some(palette.get(theme.point)),
        point_border_color: Some(palette.get(theme.point_border)),
        point_border_width: Some(theme.point_border_width),
        point_radius: Some(theme.point_radius),
        point_hover_radius: Some(theme.point_hover_radius),
        point_hover_background_color: Some(palette.get(theme.point_hover)),
        point_hover_border_color: Some(palette.get(theme.point_border)),
        point_hover_border_width: Some(theme.point_border_width),
        ..Dataset::default()
    };

    let spec = ChartSpec {
        kind: ChartKind::Line,
        data: ChartData {
            labels,
            datasets: vec![dataset],
        },
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            interaction: Some(InteractionOptions {
                intersect: false,
                mode: "index".to_owned(),
            }),
            plugins: PluginOptions {
                legend: LegendOptions { display: false },
                tooltip: tooltip_options(palette, theme),
            },
            scales: Some(Scales {
                x: axis_options(palette, theme, theme.grid_alpha_x),
                y: axis_options(palette, theme, theme.grid_alpha_y),
            }),
            cutout: None,
            animation: None,
        },
        tooltip_labels,
        tick_affixes: Some(affixes),
    };
    spec.validate()?;
    Ok(spec)
}

/// Revenue doughnut chart: one slice per entry, in entry order, colored by
/// cycling through the theme's slice swatches.
pub fn proportion_chart(
    entries: &[RevenueEntry],
    palette: &Palette,
    theme: &ChartTheme,
) -> PageResult<ChartSpec> {
    let labels = entries.iter().map(|entry| entry.name.clone()).collect();
    let values = entries
        .iter()
        .map(|entry| decimal_to_f64(entry.share, "revenue share"))
        .collect::<PageResult<Vec<_>>>()?;
    let colors = palette.cycle(&theme.slice_cycle, entries.len())?;
    let tooltip_labels = entries
        .iter()
        .map(|entry| {
            format!(
                "{}: {}% ({})",
                entry.name,
                entry.share.normalize(),
                entry.amount
            )
        })
        .collect();

    let dataset = Dataset {
        data: values,
        background_color: Some(ColorValue::PerPoint(colors)),
        border_color: Some(ColorValue::Single(palette.get(theme.slice_border))),
        border_width: Some(theme.slice_border_width),
        hover_offset: Some(theme.slice_hover_offset),
        hover_border_width: Some(theme.slice_hover_border_width),
        ..Dataset::default()
    };

    let spec = ChartSpec {
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels,
            datasets: vec![dataset],
        },
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            interaction: None,
            plugins: PluginOptions {
                legend: LegendOptions { display: false },
                tooltip: tooltip_options(palette, theme),
            },
            scales: None,
            cutout: Some(theme.doughnut_cutout.clone()),
            animation: Some(AnimationOptions {
                animate_rotate: true,
                duration: theme.rotate_duration_ms,
                easing: theme.rotate_easing.clone(),
            }),
        },
        tooltip_labels,
        tick_affixes: None,
    };
    spec.validate()?;
    Ok(spec)
}
