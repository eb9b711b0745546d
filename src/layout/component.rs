use crate::geometry::Rect;

use super::command::LayoutDisplayRole;

/// What a component region holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Primary,
    Secondary,
    Container,
}

/// How a component claims space along its parent's axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    /// Share the remaining space evenly with the other auto siblings.
    Auto,
    /// Use the explicit width/height.
    Explicit,
}

/// Whether a component takes part in automatic packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    Auto,
    /// Placed at `offset` relative to the parent region, outside the packing.
    Explicit,
}

/// Packing axis for a container's auto-positioned children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Row,
    Column,
}

/// Declarative screen-region descriptor, rebuilt on every draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutComponent {
    pub kind: ComponentType,
    /// Ring position shown by a Primary/Secondary component.
    pub slot: usize,
    pub spacing: Spacing,
    pub positioning: Positioning,
    /// Zero means "derive from the parent region".
    pub width: u16,
    pub height: u16,
    pub offset: Option<(u16, u16)>,
    pub direction: Direction,
    pub gap: u16,
    pub children: Vec<LayoutComponent>,
}

impl LayoutComponent {
    pub fn new(
        kind: ComponentType,
        spacing: Spacing,
        positioning: Positioning,
        width: u16,
        height: u16,
        offset: Option<(u16, u16)>,
    ) -> Self {
        Self {
            kind,
            slot: 0,
            spacing,
            positioning,
            width,
            height,
            offset,
            direction: Direction::Row,
            gap: 0,
            children: Vec::new(),
        }
    }

    pub fn display(role: LayoutDisplayRole, slot: usize) -> Self {
        let kind = match role {
            LayoutDisplayRole::Primary => ComponentType::Primary,
            LayoutDisplayRole::Secondary => ComponentType::Secondary,
        };
        Self {
            slot,
            ..Self::new(kind, Spacing::Auto, Positioning::Auto, 0, 0, None)
        }
    }

    pub fn primary(slot: usize) -> Self {
        Self::display(LayoutDisplayRole::Primary, slot)
    }

    pub fn secondary(slot: usize) -> Self {
        Self::display(LayoutDisplayRole::Secondary, slot)
    }

    pub fn container(direction: Direction, children: Vec<LayoutComponent>) -> Self {
        Self {
            direction,
            children,
            ..Self::new(
                ComponentType::Container,
                Spacing::Auto,
                Positioning::Auto,
                0,
                0,
                None,
            )
        }
    }

    pub fn row(children: Vec<LayoutComponent>) -> Self {
        Self::container(Direction::Row, children)
    }

    pub fn column(children: Vec<LayoutComponent>) -> Self {
        Self::container(Direction::Column, children)
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.spacing = Spacing::Explicit;
        self.width = width;
        self.height = height;
        self
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.positioning = Positioning::Explicit;
        self.offset = Some((x, y));
        self
    }

    pub fn with_gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn role(&self) -> Option<LayoutDisplayRole> {
        match self.kind {
            ComponentType::Primary => Some(LayoutDisplayRole::Primary),
            ComponentType::Secondary => Some(LayoutDisplayRole::Secondary),
            ComponentType::Container => None,
        }
    }
}

/// A display region after resolution against the display bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedComponent {
    pub role: LayoutDisplayRole,
    pub slot: usize,
    pub rect: Rect,
}

/// Resolve a component list laid out along `direction` inside `bounds`.
///
/// Only display components are returned, depth-first in declaration order.
pub fn resolve_components(
    components: &[LayoutComponent],
    bounds: Rect,
    direction: Direction,
) -> Vec<ResolvedComponent> {
    let mut resolved = Vec::new();
    resolve_level(components, bounds, direction, 0, &mut resolved);
    resolved
}

fn resolve_level(
    components: &[LayoutComponent],
    bounds: Rect,
    direction: Direction,
    gap: u16,
    accum: &mut Vec<ResolvedComponent>,
) {
    let packed: Vec<&LayoutComponent> = components
        .iter()
        .filter(|component| component.positioning == Positioning::Auto)
        .collect();

    let axis_length = match direction {
        Direction::Row => bounds.width,
        Direction::Column => bounds.height,
    };
    let gap_total = gap.saturating_mul(packed.len().saturating_sub(1) as u16);
    let constraints: Vec<Constraint> = packed
        .iter()
        .map(|component| match (component.spacing, direction) {
            (Spacing::Explicit, Direction::Row) if component.width > 0 => {
                Constraint::Fixed(component.width)
            }
            (Spacing::Explicit, Direction::Column) if component.height > 0 => {
                Constraint::Fixed(component.height)
            }
            _ => Constraint::Flex(1),
        })
        .collect();
    let spans = distribute(axis_length.saturating_sub(gap_total), &constraints);

    let mut cursor = match direction {
        Direction::Row => bounds.x,
        Direction::Column => bounds.y,
    };
    let mut spans = spans.into_iter();

    for component in components {
        let rect = match component.positioning {
            Positioning::Auto => {
                let span = spans.next().unwrap_or(0);
                let rect = match direction {
                    Direction::Row => Rect::new(
                        cursor,
                        bounds.y,
                        span,
                        cross_extent(component.spacing, component.height, bounds.height),
                    ),
                    Direction::Column => Rect::new(
                        bounds.x,
                        cursor,
                        cross_extent(component.spacing, component.width, bounds.width),
                        span,
                    ),
                };
                cursor = cursor.saturating_add(span).saturating_add(gap);
                rect
            }
            Positioning::Explicit => {
                let (dx, dy) = component.offset.unwrap_or((0, 0));
                let width = if component.width > 0 {
                    component.width
                } else {
                    bounds.width
                };
                let height = if component.height > 0 {
                    component.height
                } else {
                    bounds.height
                };
                Rect::new(
                    bounds.x.saturating_add(dx),
                    bounds.y.saturating_add(dy),
                    width,
                    height,
                )
                .clip_to(&bounds)
            }
        };

        match component.role() {
            Some(role) => accum.push(ResolvedComponent {
                role,
                slot: component.slot,
                rect,
            }),
            None => resolve_level(
                &component.children,
                rect,
                component.direction,
                component.gap,
                accum,
            ),
        }
    }
}

fn cross_extent(spacing: Spacing, explicit: u16, available: u16) -> u16 {
    match spacing {
        Spacing::Explicit if explicit > 0 => explicit.min(available),
        _ => available,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Constraint {
    Fixed(u16),
    Flex(u16),
}

#[derive(Debug, Clone)]
struct Segment {
    length: u32,
    flex: u32,
}

fn distribute(distributable: u16, constraints: &[Constraint]) -> Vec<u16> {
    if constraints.is_empty() {
        return Vec::new();
    }

    let mut segments: Vec<Segment> = constraints
        .iter()
        .map(|constraint| match *constraint {
            Constraint::Fixed(value) => Segment {
                length: value as u32,
                flex: 0,
            },
            Constraint::Flex(weight) => Segment {
                length: 0,
                flex: weight.max(1) as u32,
            },
        })
        .collect();

    let total_available = distributable as u32;
    let used: u32 = segments.iter().map(|s| s.length).sum();

    if used > total_available {
        shrink_segments(&mut segments, used - total_available);
    } else {
        distribute_flex(&mut segments, total_available - used);
    }

    segments
        .into_iter()
        .map(|segment| segment.length.min(u16::MAX as u32) as u16)
        .collect()
}

fn shrink_segments(segments: &mut [Segment], mut over: u32) {
    while over > 0 {
        let mut changed = false;
        for segment in segments.iter_mut().rev() {
            if segment.length > 0 {
                segment.length -= 1;
                over -= 1;
                changed = true;
                if over == 0 {
                    break;
                }
            }
        }

        if !changed {
            break;
        }
    }
}

fn distribute_flex(segments: &mut [Segment], remaining: u32) {
    let total_flex: u32 = segments.iter().map(|s| s.flex).sum();
    if total_flex == 0 || remaining == 0 {
        return;
    }

    let mut leftover = remaining;
    for segment in segments.iter_mut().filter(|s| s.flex > 0) {
        let share = (remaining * segment.flex) / total_flex;
        segment.length += share;
        leftover -= share;
    }

    for segment in segments.iter_mut().filter(|s| s.flex > 0) {
        if leftover == 0 {
            break;
        }
        segment.length += 1;
        leftover -= 1;
    }
}
