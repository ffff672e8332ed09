// ============================================
// Frame Plan - Порядок проходов кадра
// ============================================
// 1. Проход глубины: все ShadowCaster
// 2. Конец прохода глубины (shadow map освобождена для чтения)
// 3. Освещённый проход: ShadowCaster и LitOnly в исходном порядке
// 4. Фон (скайбокс) последним
//
// План строится из ролей и исполняется посетителем: на GPU это
// GpuFrame, в тестах: запись шагов.

use super::drawable::DrawRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStep {
    BeginDepth,
    /// Индекс объекта в списке сцены
    Depth(usize),
    EndDepth,
    BeginLit,
    Lit(usize),
    Background(usize),
    EndLit,
}

pub trait PassVisitor {
    fn visit(&mut self, step: PassStep);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramePlan {
    steps: Vec<PassStep>,
}

impl FramePlan {
    pub fn build<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = DrawRole>,
    {
        let roles: Vec<DrawRole> = roles.into_iter().collect();
        let mut steps = Vec::with_capacity(roles.len() * 2 + 4);

        steps.push(PassStep::BeginDepth);
        steps.extend(
            roles
                .iter()
                .enumerate()
                .filter(|(_, role)| role.casts_shadow())
                .map(|(i, _)| PassStep::Depth(i)),
        );
        steps.push(PassStep::EndDepth);

        steps.push(PassStep::BeginLit);
        steps.extend(
            roles
                .iter()
                .enumerate()
                .filter(|(_, role)| **role != DrawRole::Background)
                .map(|(i, _)| PassStep::Lit(i)),
        );
        steps.extend(
            roles
                .iter()
                .enumerate()
                .filter(|(_, role)| **role == DrawRole::Background)
                .map(|(i, _)| PassStep::Background(i)),
        );
        steps.push(PassStep::EndLit);

        Self { steps }
    }

    pub fn steps(&self) -> &[PassStep] {
        &self.steps
    }

    pub fn run<V: PassVisitor>(&self, visitor: &mut V) {
        for step in &self.steps {
            visitor.visit(*step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        steps: Vec<PassStep>,
    }

    impl PassVisitor for Recorder {
        fn visit(&mut self, step: PassStep) {
            self.steps.push(step);
        }
    }

    /// Порядок сцены: скайбокс, террейн, здание, паб, дерево, персонаж
    fn scene_roles() -> Vec<DrawRole> {
        use DrawRole::*;
        vec![Background, ShadowCaster, ShadowCaster, ShadowCaster, ShadowCaster, LitOnly]
    }

    fn position(steps: &[PassStep], wanted: PassStep) -> usize {
        steps.iter().position(|s| *s == wanted).unwrap()
    }

    #[test]
    fn test_full_order() {
        let plan = FramePlan::build(scene_roles());
        let mut rec = Recorder::default();
        plan.run(&mut rec);

        use PassStep::*;
        assert_eq!(
            rec.steps,
            vec![
                BeginDepth,
                Depth(1),
                Depth(2),
                Depth(3),
                Depth(4),
                EndDepth,
                BeginLit,
                Lit(1),
                Lit(2),
                Lit(3),
                Lit(4),
                Lit(5),
                Background(0),
                EndLit,
            ]
        );
    }

    #[test]
    fn test_every_depth_draw_precedes_every_lit_draw() {
        let plan = FramePlan::build(scene_roles());
        let steps = plan.steps();
        let end_depth = position(steps, PassStep::EndDepth);

        for (i, step) in steps.iter().enumerate() {
            match step {
                PassStep::Depth(_) => assert!(i < end_depth),
                PassStep::Lit(_) | PassStep::Background(_) => assert!(i > end_depth),
                _ => {}
            }
        }
    }

    #[test]
    fn test_background_never_in_depth_and_last() {
        let plan = FramePlan::build(scene_roles());
        let steps = plan.steps();

        assert!(!steps.contains(&PassStep::Depth(0)));
        let bg = position(steps, PassStep::Background(0));
        assert_eq!(bg, steps.len() - 2);
        assert_eq!(steps.last(), Some(&PassStep::EndLit));
    }

    #[test]
    fn test_lit_only_skips_depth() {
        let plan = FramePlan::build([DrawRole::LitOnly, DrawRole::ShadowCaster]);
        assert!(!plan.steps().contains(&PassStep::Depth(0)));
        assert!(plan.steps().contains(&PassStep::Depth(1)));
        assert!(plan.steps().contains(&PassStep::Lit(0)));
    }

    #[test]
    fn test_empty_scene_still_clears() {
        let plan = FramePlan::build(std::iter::empty());
        use PassStep::*;
        assert_eq!(plan.steps(), &[BeginDepth, EndDepth, BeginLit, EndLit]);
    }
}
