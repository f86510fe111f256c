use super::*;
use std::rc::Rc;

fn int_unit(i: i32) -> SolidType {
    SolidType::Unit(Scalar::Integer(i))
}

fn float_unit(x: f64) -> SolidType {
    SolidType::Unit(Scalar::Float(x))
}

fn tuple(items: &[(SolidType, bool)]) -> SolidType {
    SolidType::tuple(
        items
            .iter()
            .map(|(ty, optional)| TypeEntry {
                ty: ty.clone(),
                optional: *optional,
            })
            .collect(),
    )
}

fn record(fields: &[(&str, SolidType, bool)]) -> SolidType {
    SolidType::record(
        fields
            .iter()
            .map(|(key, ty, optional)| {
                (
                    key.to_string(),
                    TypeEntry {
                        ty: ty.clone(),
                        optional: *optional,
                    },
                )
            })
            .collect(),
    )
}

fn alias(lattice: &mut Lattice, name: &str) -> SolidType {
    let id = lattice.declare_alias(name);
    SolidType::Alias {
        id,
        name: name.to_string(),
    }
}

fn define(lattice: &mut Lattice, alias: &SolidType, definition: SolidType) {
    if let SolidType::Alias { id, .. } = alias {
        lattice.define_alias(*id, definition);
    }
}

// ==================== Bounds ====================

#[test]
fn test_never_and_unknown_bound_everything() {
    let samples = [
        SolidType::Integer,
        SolidType::Void,
        SolidType::Object,
        int_unit(3),
        SolidType::list(SolidType::String),
    ];
    for ty in &samples {
        assert!(SolidType::Never.is_subtype_of(ty), "never ⊑ {ty}");
        assert!(ty.is_subtype_of(&SolidType::Unknown), "{ty} ⊑ unknown");
    }
    assert!(!SolidType::Unknown.is_subtype_of(&SolidType::Object));
}

#[test]
fn test_void_is_outside_obj() {
    assert!(!SolidType::Void.is_subtype_of(&SolidType::Object));
    assert!(!SolidType::Object.is_subtype_of(&SolidType::Void));
    assert_eq!(SolidType::Void.intersect(&SolidType::Integer), SolidType::Never);
    assert_eq!(SolidType::Unknown.subtract(&SolidType::Void), SolidType::Object);
}

// ==================== Primitives and units ====================

#[test]
fn test_int_and_float_are_disjoint() {
    assert!(!SolidType::Integer.is_subtype_of(&SolidType::Float));
    assert!(!SolidType::Float.is_subtype_of(&SolidType::Integer));
    assert_eq!(SolidType::Integer.intersect(&SolidType::Float), SolidType::Never);

    let numeric = SolidType::Integer.union(&SolidType::Float);
    assert!(SolidType::Integer.is_subtype_of(&numeric));
    assert!(SolidType::Float.is_subtype_of(&numeric));
}

#[test]
fn test_units_narrow_their_primitive() {
    assert!(int_unit(42).is_subtype_of(&SolidType::Integer));
    assert!(!float_unit(0.0).is_subtype_of(&SolidType::Integer));
    assert!(!float_unit(-0.0).is_subtype_of(&float_unit(0.0)));
    assert!(SolidType::null().is_subtype_of(&SolidType::Object));
    assert_eq!(int_unit(42).intersect(&SolidType::Integer), int_unit(42));
}

#[test]
fn test_bool_is_true_or_false() {
    let split = SolidType::Union(vec![
        SolidType::boolean_unit(true),
        SolidType::boolean_unit(false),
    ]);
    assert!(SolidType::Boolean.is_subtype_of(&split));
    assert!(split.is_subtype_of(&SolidType::Boolean));
    assert!(!SolidType::Boolean.is_subtype_of(&SolidType::boolean_unit(true)));
}

// ==================== Normalization ====================

#[test]
fn test_union_normalizes() {
    assert_eq!(SolidType::Integer.union(&SolidType::Never), SolidType::Integer);
    assert_eq!(SolidType::Integer.union(&SolidType::Unknown), SolidType::Unknown);
    assert_eq!(int_unit(42).union(&SolidType::Integer), SolidType::Integer);
    assert_eq!(
        SolidType::boolean_unit(true).union(&SolidType::boolean_unit(false)),
        SolidType::Boolean
    );
    assert_eq!(
        SolidType::Object.union(&tuple(&[(SolidType::Integer, false)])),
        SolidType::Object
    );
    assert_eq!(
        SolidType::union_all([SolidType::Integer, SolidType::Integer.union(&SolidType::String)]),
        SolidType::Union(vec![SolidType::Integer, SolidType::String])
    );
}

#[test]
fn test_intersection_distributes_over_union() {
    let either = SolidType::Integer.union(&SolidType::String);
    assert_eq!(either.intersect(&SolidType::Integer), SolidType::Integer);
    assert_eq!(SolidType::Object.intersect(&either), either);
}

#[test]
fn test_tuple_intersection_is_structural() {
    let wide = tuple(&[(SolidType::Integer, false), (SolidType::String, false)]);
    let narrow = tuple(&[(SolidType::Integer, false)]);
    assert_eq!(wide.intersect(&narrow), wide);

    let clash = tuple(&[(SolidType::Float, false)]);
    assert_eq!(narrow.intersect(&clash), SolidType::Never);
}

#[test]
fn test_subtract() {
    assert_eq!(
        SolidType::Boolean.subtract(&SolidType::boolean_unit(true)),
        SolidType::boolean_unit(false)
    );
    assert_eq!(
        SolidType::Integer.nullable().subtract(&SolidType::null()),
        SolidType::Integer
    );
    assert_eq!(int_unit(4).subtract(&SolidType::Integer), SolidType::Never);
    assert_eq!(SolidType::Integer.subtract(&int_unit(0)), SolidType::Integer);
}

#[test]
fn test_equals_ignores_member_order() {
    let a = SolidType::Union(vec![SolidType::Integer, SolidType::Float]);
    let b = SolidType::Union(vec![SolidType::Float, SolidType::Integer]);
    assert!(a.equals(&b));
    assert!(!a.equals(&SolidType::Integer));
}

// ==================== Structural subtyping ====================

#[test]
fn test_tuple_width_subtyping() {
    let pair = tuple(&[(SolidType::Integer, false), (SolidType::String, false)]);
    let single = tuple(&[(SolidType::Integer, false)]);
    let with_optional = tuple(&[(SolidType::Integer, false), (SolidType::String, true)]);

    assert!(pair.is_subtype_of(&single));
    assert!(!single.is_subtype_of(&pair));
    assert!(single.is_subtype_of(&with_optional));
    assert!(pair.is_subtype_of(&with_optional));
    assert!(!with_optional.is_subtype_of(&pair));
    assert!(!tuple(&[(SolidType::Integer, true)]).is_subtype_of(&single));
}

#[test]
fn test_record_width_subtyping() {
    let full = record(&[("a", SolidType::Integer, false), ("b", SolidType::String, false)]);
    let only_a = record(&[("a", SolidType::Integer, false)]);
    let maybe_b = record(&[("a", SolidType::Integer, false), ("b", SolidType::String, true)]);

    assert!(full.is_subtype_of(&only_a));
    assert!(only_a.is_subtype_of(&maybe_b));
    assert!(!only_a.is_subtype_of(&full));
    assert!(!record(&[("a", SolidType::Float, false)]).is_subtype_of(&only_a));
}

#[test]
fn test_mutable_collections_are_invariant() {
    let ints = SolidType::list(SolidType::Integer);
    let mut_ints = ints.to_mutable().unwrap();
    let mut_nums = SolidType::list(SolidType::Integer.union(&SolidType::Float))
        .to_mutable()
        .unwrap();

    assert!(mut_ints.is_subtype_of(&ints));
    assert!(!ints.is_subtype_of(&mut_ints));
    assert!(!mut_ints.is_subtype_of(&mut_nums));
    assert!(SolidType::list(int_unit(1)).is_subtype_of(&ints));

    let map = SolidType::map(SolidType::String, SolidType::Integer);
    assert!(map.to_mutable().unwrap().is_subtype_of(&map));
    assert!(!SolidType::map(SolidType::String, int_unit(1))
        .to_mutable()
        .unwrap()
        .is_subtype_of(&map.to_mutable().unwrap()));
}

#[test]
fn test_collection_kinds_do_not_mix() {
    assert!(!SolidType::list(SolidType::Integer).is_subtype_of(&SolidType::set(SolidType::Integer)));
    assert!(!SolidType::dict(SolidType::Integer).is_subtype_of(&record(&[])));
}

// ==================== Inclusion ====================

#[test]
fn test_includes() {
    let value = Value::Tuple(Rc::new(vec![Value::Integer(1), Value::String("a".into())]));
    let single = tuple(&[(SolidType::Integer, false)]);
    assert!(single.includes(&value));
    assert!(!single.to_mutable().unwrap().includes(&value));
    assert!(!tuple(&[(SolidType::Float, false)]).includes(&value));

    assert!(SolidType::Integer.includes(&Value::Integer(7)));
    assert!(!SolidType::Integer.includes(&Value::Float(7.0)));
    assert!(!float_unit(0.0).includes(&Value::Float(-0.0)));
    assert!(!SolidType::Void.includes(&Value::Null));
    assert!(SolidType::Unknown.includes(&Value::Null));
}

// ==================== Aliases ====================

#[test]
fn test_recursive_alias() {
    let mut lattice = Lattice::new();
    let chain = alias(&mut lattice, "Chain");
    define(
        &mut lattice,
        &chain,
        SolidType::null().union(&tuple(&[(SolidType::Integer, false), (chain.clone(), false)])),
    );

    let tail = Value::Tuple(Rc::new(vec![Value::Integer(2), Value::Null]));
    let head = Value::Tuple(Rc::new(vec![Value::Integer(1), tail]));
    assert!(lattice.includes(&chain, &head));
    assert!(!lattice.includes(&chain, &Value::Integer(1)));

    assert!(lattice.is_subtype(&chain, &SolidType::Object));
    assert!(lattice.is_subtype(&SolidType::null(), &chain));

    let other = alias(&mut lattice, "Other");
    define(
        &mut lattice,
        &other,
        SolidType::null().union(&tuple(&[(SolidType::Integer, false), (other.clone(), false)])),
    );
    assert!(lattice.equals(&chain, &other));
}

#[test]
fn test_alias_cycle_resolves_to_never() {
    let mut lattice = Lattice::new();
    let a = alias(&mut lattice, "A");
    let b = alias(&mut lattice, "B");
    define(&mut lattice, &a, b.clone());
    define(&mut lattice, &b, a.clone());

    assert_eq!(lattice.resolve(&a), SolidType::Never);
    assert!(lattice.is_subtype(&a, &SolidType::Integer));
    assert!(!lattice.includes(&a, &Value::Null));
}

#[test]
fn test_failed_assumption_is_not_cached() {
    let mut lattice = Lattice::new();
    let a = alias(&mut lattice, "A");
    let b = alias(&mut lattice, "B");
    define(
        &mut lattice,
        &a,
        tuple(&[(tuple(&[(a.clone(), false)]), false), (SolidType::Integer, false)]),
    );
    define(
        &mut lattice,
        &b,
        tuple(&[(tuple(&[(b.clone(), false)]), false), (SolidType::String, false)]),
    );

    assert!(!lattice.is_subtype(&a, &b));
    // `[A] ⊑ [B]` held only while `A ⊑ B` was assumed
    assert!(!lattice.is_subtype(
        &tuple(&[(a.clone(), false)]),
        &tuple(&[(b.clone(), false)])
    ));
}

#[test]
fn test_bare_self_reference_adds_no_values() {
    let mut lattice = Lattice::new();
    let t = alias(&mut lattice, "T");
    define(&mut lattice, &t, t.union(&SolidType::Integer));

    assert_eq!(lattice.resolve(&t), SolidType::Integer);
    assert!(lattice.is_subtype(&SolidType::Integer, &t));
    assert!(lattice.is_subtype(&int_unit(7), &t));
    assert!(!lattice.is_subtype(&SolidType::Void, &t));
    assert!(!lattice.is_subtype(&SolidType::String, &t));
    assert!(!lattice.is_subtype(&tuple(&[(SolidType::String, false)]), &tuple(&[(t.clone(), false)])));
    assert!(lattice.equals(&t, &SolidType::Integer));
}

#[test]
fn test_mutual_bare_references_keep_only_their_ground_members() {
    let mut lattice = Lattice::new();
    let a = alias(&mut lattice, "A");
    let b = alias(&mut lattice, "B");
    define(&mut lattice, &a, b.union(&SolidType::Integer));
    define(&mut lattice, &b, a.union(&SolidType::String));

    let ground = SolidType::Integer.union(&SolidType::String);
    assert!(lattice.equals(&a, &ground));
    assert!(lattice.equals(&b, &ground));
    assert!(!lattice.is_subtype(&SolidType::Float, &a));

    let empty = alias(&mut lattice, "Empty");
    define(&mut lattice, &empty, empty.intersect(&SolidType::Integer));
    assert_eq!(lattice.resolve(&empty), SolidType::Never);
}

#[test]
fn test_guarded_self_reference_still_recurses() {
    let mut lattice = Lattice::new();
    let t = alias(&mut lattice, "T");
    define(
        &mut lattice,
        &t,
        t.union(&SolidType::list(t.clone())).union(&SolidType::Integer),
    );

    assert_eq!(
        lattice.resolve(&t),
        SolidType::list(t.clone()).union(&SolidType::Integer)
    );
    assert!(lattice.is_subtype(&SolidType::list(SolidType::Integer), &t));
    assert!(lattice.is_subtype(&SolidType::list(SolidType::list(int_unit(1))), &t));
    assert!(!lattice.is_subtype(&SolidType::list(SolidType::String), &t));
    assert!(lattice.includes(&t, &Value::Integer(1)));
}

// ==================== Laws over a sample ====================

fn law_samples() -> Vec<SolidType> {
    vec![
        SolidType::Never,
        SolidType::Unknown,
        SolidType::Void,
        SolidType::Object,
        SolidType::Boolean,
        SolidType::boolean_unit(true),
        SolidType::null(),
        SolidType::Integer,
        int_unit(3),
        SolidType::Float,
        float_unit(-0.0),
        SolidType::String,
        SolidType::Integer.union(&SolidType::Float),
        SolidType::Integer.nullable(),
        SolidType::list(SolidType::Integer),
        SolidType::list(SolidType::Integer.union(&SolidType::String)),
        SolidType::list(SolidType::Integer).to_mutable().unwrap(),
        tuple(&[(SolidType::Integer, false)]),
        tuple(&[(SolidType::Integer, false), (SolidType::String, false)]),
        record(&[("a", SolidType::Integer, false)]),
        record(&[("a", SolidType::Integer, true)]),
        SolidType::map(SolidType::String, SolidType::Float),
    ]
}

#[test]
fn test_subtyping_is_a_partial_order() {
    let samples = law_samples();
    let mut lattice = Lattice::new();
    for a in &samples {
        assert!(lattice.is_subtype(a, a), "{a} ⊑ {a}");
        for b in &samples {
            if lattice.is_subtype(a, b) && lattice.is_subtype(b, a) {
                assert_eq!(a, b, "{a} and {b} are mutual subtypes");
            }
            for c in &samples {
                if lattice.is_subtype(a, b) && lattice.is_subtype(b, c) {
                    assert!(lattice.is_subtype(a, c), "{a} ⊑ {b} ⊑ {c}");
                }
            }
        }
    }
}

#[test]
fn test_unknown_and_never_are_identities() {
    for ty in law_samples() {
        assert!(ty.intersect(&SolidType::Unknown).equals(&ty), "{ty} & unknown");
        assert!(ty.union(&SolidType::Never).equals(&ty), "{ty} | never");
        assert!(ty.union(&ty).equals(&ty), "{ty} | {ty}");
        assert!(ty.intersect(&ty).equals(&ty), "{ty} & {ty}");
    }
}
