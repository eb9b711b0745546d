use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::{Layout, LayoutDisplayRole, ResolvedComponent};
use crate::width::{display_width, truncate_display};

use super::texture::TextureCache;

const SHADES: [char; 4] = [' ', '░', '▒', '▓'];

/// Renderer runtime parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Row used for the scoreboard line; `None` puts it under the layout.
    pub status_row: Option<u16>,
    /// Clear the screen before every frame.
    pub clear: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            status_row: None,
            clear: true,
        }
    }
}

/// Paints resolved layout components as labelled, shaded boxes.
pub struct TerminalRenderer {
    settings: RendererSettings,
}

impl TerminalRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn render(
        &mut self,
        writer: &mut impl Write,
        layout: &dyn Layout,
        displays: &DisplayRegistry,
        textures: &TextureCache,
    ) -> Result<()> {
        let core = layout.core();
        if self.settings.clear {
            queue!(writer, Clear(ClearType::All))?;
        }

        let active = core.active_display();
        for component in core.resolved_components() {
            let Ok(id) = core.ring(component.role).get(component.slot) else {
                continue;
            };
            let name = displays
                .display_info(id)
                .map(|info| info.label().to_string())
                .unwrap_or_default();
            let tag = match component.role {
                LayoutDisplayRole::Primary => 'P',
                LayoutDisplayRole::Secondary => 'S',
            };
            let marker = if active == Some(id) { "*" } else { "" };
            let label = format!("{marker}{name} [{tag}{}]", component.slot);
            let shade = textures
                .brightness(id)
                .map(|level| SHADES[(level / 64) as usize])
                .unwrap_or(' ');
            paint_tile(writer, &component, &label, shade)?;
        }

        let bounds = core.display_bounds();
        let row = self.settings.status_row.unwrap_or(bounds.bottom());
        let status = format!("{} | {}", core.layout_name(), core.scoreboard().status_line());
        let status = truncate_display(&status, bounds.width.max(1) as usize);
        queue!(writer, MoveTo(bounds.x, row), Print(status))?;

        writer.flush()?;
        Ok(())
    }
}

fn paint_tile(
    writer: &mut impl Write,
    component: &ResolvedComponent,
    label: &str,
    shade: char,
) -> Result<()> {
    let Rect {
        x,
        y,
        width,
        height,
    } = component.rect;
    if width == 0 || height == 0 {
        return Ok(());
    }
    if width < 2 || height < 2 {
        let text = truncate_display(label, width as usize);
        queue!(writer, MoveTo(x, y), Print(text))?;
        return Ok(());
    }

    let inner = (width - 2) as usize;
    let title = truncate_display(label, inner);
    let fill = inner.saturating_sub(display_width(&title));
    queue!(
        writer,
        MoveTo(x, y),
        Print(format!("┌{title}{}┐", "─".repeat(fill)))
    )?;

    let body = shade.to_string().repeat(inner);
    for row in 1..height - 1 {
        queue!(writer, MoveTo(x, y + row), Print(format!("│{body}│")))?;
    }
    queue!(
        writer,
        MoveTo(x, y + height - 1),
        Print(format!("└{}┘", "─".repeat(inner)))
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayInfo;
    use crate::layout::variants::{WideLayout, WideParams};
    use crate::render::ImageResolver;

    #[test]
    fn paints_tile_and_status_line() {
        let mut displays = DisplayRegistry::new();
        displays.register(DisplayInfo::new("front", 2, 2, 1));
        displays.register(DisplayInfo::new("rear", 2, 2, 1));
        displays.update_frame(1, 2, 2, 1, vec![255; 4]).unwrap();

        let mut layout = WideLayout::new(&WideParams::default(), &displays).unwrap();
        layout.core_mut().set_display_bounds(Rect::new(0, 0, 40, 4));
        layout.draw(&displays).unwrap();
        let mut textures = TextureCache::new();
        let requests = layout.core_mut().take_image_requests();
        textures.resolve(&displays, &requests).unwrap();

        let mut output = Vec::new();
        TerminalRenderer::with_default()
            .render(&mut output, &layout, &displays, &textures)
            .unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("\u{1b}[1;1H┌*rear [P0]"));
        assert!(rendered.contains("│▓▓▓▓"));
        assert!(rendered.contains("\u{1b}[5;1HWide Angle | Robot: on"));
    }

    #[test]
    fn tiny_tiles_only_get_a_label() {
        let component = ResolvedComponent {
            role: LayoutDisplayRole::Secondary,
            slot: 0,
            rect: Rect::new(3, 2, 4, 1),
        };
        let mut output = Vec::new();
        paint_tile(&mut output, &component, "camera", ' ').unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.ends_with("cam…"));
    }
}
