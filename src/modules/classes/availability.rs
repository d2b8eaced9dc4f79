//! Teacher availability and copy planning.
//!
//! Pure set computations over already-loaded rows; the service does the
//! lookups and persistence around them.

use std::collections::HashSet;

use mamnon_models::classes::Class;
use mamnon_models::ids::{ClassId, UserId};
use mamnon_models::users::User;

/// Teachers already holding a class in the year, except the incumbent of
/// `current_class` (so editing a class keeps its own teacher selectable).
pub fn assigned_teachers(classes: &[Class], current_class: Option<ClassId>) -> HashSet<UserId> {
    classes
        .iter()
        .filter(|class| Some(class.id) != current_class)
        .map(|class| class.home_room_teacher)
        .collect()
}

/// `teachers` minus excluded-department managers minus already-assigned teachers.
pub fn available_teachers(
    teachers: Vec<User>,
    excluded_managers: &HashSet<UserId>,
    assigned: &HashSet<UserId>,
) -> Vec<User> {
    teachers
        .into_iter()
        .filter(|t| !excluded_managers.contains(&t.id) && !assigned.contains(&t.id))
        .collect()
}

/// Outcome of matching source classes to destination teachers.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CopyPlan<'a> {
    /// Source class and the teacher it gets in the destination year
    pub assignments: Vec<(&'a Class, UserId)>,
    /// Source classes left without a teacher
    pub skipped: Vec<&'a Class>,
}

/// First-fit teacher assignment for a year-to-year copy.
///
/// Walks `source` in order. A class keeps its teacher when that teacher is
/// eligible and still unused; otherwise it takes the first unused teacher from
/// `eligible`. Once every eligible teacher is used, remaining classes are skipped.
pub fn plan_copy<'a>(source: &'a [Class], eligible: &[UserId]) -> CopyPlan<'a> {
    let eligible_set: HashSet<UserId> = eligible.iter().copied().collect();
    let mut consumed: HashSet<UserId> = HashSet::new();
    let mut plan = CopyPlan::default();

    for class in source {
        let original = class.home_room_teacher;
        let teacher = if eligible_set.contains(&original) && !consumed.contains(&original) {
            Some(original)
        } else {
            eligible.iter().copied().find(|t| !consumed.contains(t))
        };

        match teacher {
            Some(teacher) => {
                consumed.insert(teacher);
                plan.assignments.push((class, teacher));
            }
            None => plan.skipped.push(class),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mamnon_models::grades::{Grade, Sessions};
    use mamnon_models::ids::{AcademicYearId, SchoolId};
    use mamnon_models::users::UserRole;

    fn class_with(teacher: UserId) -> Class {
        Class {
            id: ClassId::new(),
            class_code: "LOP-00000000".to_string(),
            school_id: SchoolId::from_u128(1),
            academic_year_id: AcademicYearId::from_u128(1),
            grade: Grade::La,
            age_group: "Lá 1".to_string(),
            name: format!("Lá {}", teacher),
            home_room_teacher: teacher,
            sessions: Sessions::morning_only(),
            description: None,
            created_by: UserId::new(),
            is_destroyed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn teacher(id: UserId) -> User {
        User {
            id,
            school_id: Some(SchoolId::from_u128(1)),
            first_name: "Giáo".to_string(),
            last_name: "Viên".to_string(),
            email: format!("{}@example.com", id),
            role: UserRole::Teacher,
            is_active: true,
            is_destroyed: false,
            class_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_is_set_difference() {
        let (t1, t2, t3) = (UserId::new(), UserId::new(), UserId::new());
        let teachers = vec![teacher(t1), teacher(t2), teacher(t3)];
        let excluded = HashSet::from([t2]);
        let assigned = assigned_teachers(&[class_with(t3)], None);

        let available = available_teachers(teachers, &excluded, &assigned);
        let ids: Vec<_> = available.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t1]);
    }

    #[test]
    fn test_current_class_keeps_its_incumbent_available() {
        let (t1, t2) = (UserId::new(), UserId::new());
        let editing = class_with(t1);
        let other = class_with(t2);
        let classes = vec![editing.clone(), other];

        let assigned = assigned_teachers(&classes, Some(editing.id));
        assert!(!assigned.contains(&t1));
        assert!(assigned.contains(&t2));
    }

    #[test]
    fn test_plan_reuses_eligible_original_teachers() {
        let (t1, t2) = (UserId::new(), UserId::new());
        let source = vec![class_with(t1), class_with(t2)];

        let plan = plan_copy(&source, &[t2, t1]);
        assert_eq!(plan.assignments.len(), 2);
        assert_eq!(plan.assignments[0].1, t1);
        assert_eq!(plan.assignments[1].1, t2);
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_plan_substitutes_first_unused_teacher() {
        let (t1, t2, t3) = (UserId::new(), UserId::new(), UserId::new());
        let source = vec![class_with(t1), class_with(t2)];

        // t2 is gone; t3 takes over its class
        let plan = plan_copy(&source, &[t1, t3]);
        assert_eq!(plan.assignments[0].1, t1);
        assert_eq!(plan.assignments[1].1, t3);
    }

    #[test]
    fn test_plan_skips_when_pool_is_exhausted() {
        let (t1, t2) = (UserId::new(), UserId::new());
        let source = vec![class_with(t1), class_with(t2)];

        let plan = plan_copy(&source, &[t1]);
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].0.home_room_teacher, t1);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].home_room_teacher, t2);
    }

    #[test]
    fn test_plan_is_first_fit_not_optimal() {
        let (t1, t2) = (UserId::new(), UserId::new());
        // First class lost its teacher and grabs t1, leaving t1's own class without one.
        let source = vec![class_with(t2), class_with(t1)];

        let plan = plan_copy(&source, &[t1]);
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].0.home_room_teacher, t2);
        assert_eq!(plan.skipped[0].home_room_teacher, t1);
    }

    #[test]
    fn test_plan_with_no_eligible_teachers_skips_everything() {
        let source = vec![class_with(UserId::new())];
        let plan = plan_copy(&source, &[]);
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.skipped.len(), 1);
    }
}
