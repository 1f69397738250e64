use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::analysis::epochs::Evoked;
use crate::analysis::AnalysisError;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            palette: vec![BLUE, RED, GREEN, CYAN, MAGENTA, YELLOW, WHITE],
        }
    }
}
/// Draws every channel of an evoked response against time in seconds, with a
/// vertical marker at the anchor (t = 0).
pub fn render_evoked_png(evoked: &Evoked, style: PlotStyle) -> Result<Vec<u8>, AnalysisError> {
    if evoked.data.is_empty() {
        return Err(AnalysisError::Plot("evoked response has no samples".into()));
    }
    let times = evoked.times();
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let (y_min, y_max) = evoked
            .data
            .iter()
            .fold((0.0f64, 0.0f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let y_bounds = if (y_max - y_min).abs() < f64::EPSILON {
            (-1.0, 1.0)
        } else {
            (y_min, y_max)
        };
        let caption = format!("Evoked average (N = {})", evoked.nave);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(caption, ("sans-serif", 20).into_font().color(&WHITE))
            .set_label_area_size(LabelAreaPosition::Left, 45)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(evoked.tmin..evoked.tmax.max(evoked.tmin + f64::EPSILON), y_bounds.0..y_bounds.1)?;
        chart
            .configure_mesh()
            .x_desc("time (s)")
            .light_line_style(&WHITE.mix(0.1))
            .draw()?;
        chart.draw_series(LineSeries::new(
            vec![(0.0, y_bounds.0), (0.0, y_bounds.1)],
            &WHITE.mix(0.4),
        ))?;
        for (idx, channel) in evoked.data.rows().into_iter().enumerate() {
            let color = style.palette[idx % style.palette.len()];
            let series = times.iter().copied().zip(channel.iter().copied());
            chart
                .draw_series(LineSeries::new(series, &color))?
                .label(
                    evoked
                        .channel_labels
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| format!("Ch {idx}")),
                )
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
        chart
            .configure_series_labels()
            .border_style(&WHITE.mix(0.2))
            .background_style(&style.background)
            .draw()?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, AnalysisError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| AnalysisError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    #[test]
    fn evoked_plot_is_png() {
        let evoked = Evoked {
            data: Array2::from_shape_fn((2, 101), |(c, t)| (c as f64 + 1.0) * (t as f64 / 10.0).sin()),
            channel_labels: vec!["EMG L".into(), "EMG R".into()],
            sample_rate_hz: 100.0,
            tmin: -0.5,
            tmax: 0.5,
            nave: 4,
        };
        let png = render_evoked_png(&evoked, PlotStyle::default()).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
    #[test]
    fn empty_evoked_is_rejected() {
        let evoked = Evoked {
            data: Array2::zeros((0, 0)),
            channel_labels: vec![],
            sample_rate_hz: 100.0,
            tmin: 0.0,
            tmax: 0.0,
            nave: 0,
        };
        assert!(matches!(
            render_evoked_png(&evoked, PlotStyle::default()),
            Err(AnalysisError::Plot(_))
        ));
    }
}
