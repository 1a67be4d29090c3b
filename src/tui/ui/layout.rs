//! Named layout regions. A section can be switched off per frame, in which
//! case it gets no area and its neighbours share the space.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Title,
    Body,
    Status,
    Outline,
    Content,
}

/// Areas assigned by [`DynamicLayoutBuilder::build`].
pub struct DynamicLayout {
    areas: Vec<(Section, Rect)>,
}

impl DynamicLayout {
    pub fn vertical(area: Rect) -> DynamicLayoutBuilder {
        DynamicLayoutBuilder {
            area,
            direction: Direction::Vertical,
            sections: Vec::new(),
        }
    }

    pub fn horizontal(area: Rect) -> DynamicLayoutBuilder {
        DynamicLayoutBuilder {
            area,
            direction: Direction::Horizontal,
            sections: Vec::new(),
        }
    }

    /// Area of `id`, or `None` if it was hidden or never added.
    pub fn get(&self, id: Section) -> Option<Rect> {
        self.areas
            .iter()
            .find_map(|(section, rect)| (*section == id).then_some(*rect))
    }

    /// Area of a section that is always present; empty otherwise.
    pub fn area(&self, id: Section) -> Rect {
        self.get(id).unwrap_or_default()
    }
}

pub struct DynamicLayoutBuilder {
    area: Rect,
    direction: Direction,
    sections: Vec<(Section, Constraint)>,
}

impl DynamicLayoutBuilder {
    pub fn section(self, id: Section, constraint: Constraint) -> Self {
        self.section_if(true, id, constraint)
    }

    pub fn section_if(mut self, visible: bool, id: Section, constraint: Constraint) -> Self {
        if visible {
            self.sections.push((id, constraint));
        }
        self
    }

    pub fn build(self) -> DynamicLayout {
        let rects = Layout::default()
            .direction(self.direction)
            .constraints(self.sections.iter().map(|(_, c)| *c))
            .split(self.area);

        DynamicLayout {
            areas: self
                .sections
                .iter()
                .map(|(id, _)| *id)
                .zip(rects.iter().copied())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_body_status() {
        let layout = DynamicLayout::vertical(Rect::new(0, 0, 100, 50))
            .section(Section::Title, Constraint::Length(2))
            .section(Section::Body, Constraint::Min(0))
            .section(Section::Status, Constraint::Length(1))
            .build();

        assert_eq!(layout.area(Section::Title).height, 2);
        assert_eq!(layout.area(Section::Body).height, 47);
        assert_eq!(layout.area(Section::Status).y, 49);
    }

    #[test]
    fn test_outline_split_and_hidden() {
        let area = Rect::new(0, 0, 100, 50);
        let shown = DynamicLayout::horizontal(area)
            .section_if(true, Section::Outline, Constraint::Percentage(30))
            .section(Section::Content, Constraint::Min(0))
            .build();
        assert_eq!(shown.area(Section::Outline).width, 30);
        assert_eq!(shown.area(Section::Content).x, 30);

        let hidden = DynamicLayout::horizontal(area)
            .section_if(false, Section::Outline, Constraint::Percentage(30))
            .section(Section::Content, Constraint::Min(0))
            .build();
        assert!(hidden.get(Section::Outline).is_none());
        assert_eq!(hidden.area(Section::Content).width, 100);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let layout = DynamicLayout::vertical(Rect::new(0, 0, 10, 10)).build();
        assert_eq!(layout.area(Section::Title), Rect::default());
    }
}
