mod common;

use common::*;
use treebeam::search::{collect, BeamSearchSynthesizer, Progress, SynthesizerConfig};
use treebeam::{Action, ActionOptions, Ast, ErrorType, Field, Rule, Token};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "score {actual} differs from {expected}"
    );
}

fn assert_progress(actual: &[Progress], expected: &[(usize, usize, f64, Action, bool)]) {
    assert_eq!(actual.len(), expected.len(), "progress: {actual:?}");
    for (record, (id, parent, score, action, is_complete)) in actual.iter().zip(expected) {
        assert_eq!(record.id, *id);
        assert_eq!(record.parent, Some(*parent));
        assert_close(record.score, *score);
        assert_eq!(&record.action, action);
        assert_eq!(record.is_complete, *is_complete);
    }
}

fn x(field: Field) -> Ast {
    Ast::node("X", vec![field])
}

fn ysub() -> Ast {
    Ast::node("Ysub", vec![])
}

fn scenario_a() -> ScriptedOracle {
    ScriptedOracle::rules(vec![
        vec![(x_to_y(), ln(0.9)), (y_sub(), ln(0.1))],
        vec![(x_to_y(), ln(0.5)), (y_sub(), ln(1.0))],
    ])
}

#[test]
fn test_single_node_field() {
    let mut synthesizer = BeamSearchSynthesizer::new(2, scenario_a(), is_subtype);
    let rounds: Vec<_> = synthesizer
        .synthesize("query")
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rounds.len(), 2);
    assert_progress(
        &rounds[0].progress,
        &[
            (1, 0, ln(0.9), Action::ApplyRule(x_to_y()), false),
            (2, 0, ln(0.1), Action::ApplyRule(y_sub()), true),
        ],
    );
    assert_progress(
        &rounds[1].progress,
        &[(3, 1, ln(0.9), Action::ApplyRule(y_sub()), true)],
    );

    let emitted: Vec<_> = rounds
        .iter()
        .flat_map(|round| round.candidates.iter().map(|c| c.ast.clone()))
        .collect();
    assert_eq!(emitted, vec![ysub(), x(Field::single("value", "Y", ysub()))]);

    let oracle = synthesizer.oracle();
    assert_eq!(oracle.queries, vec!["query".to_string()]);
    assert_eq!(oracle.batch_sizes, vec![1, 1]);
    assert_eq!(oracle.forced.tokens.get(), 0);
    assert_eq!(oracle.forced.rules.get(), 2);
}

#[test]
fn test_collect_ranks_candidates() {
    let mut synthesizer = BeamSearchSynthesizer::new(2, scenario_a(), is_subtype);
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();
    assert_eq!(
        collected.asts(),
        vec![&x(Field::single("value", "Y", ysub())), &ysub()]
    );
    assert_close(collected.candidates[0].score, ln(0.9));
    assert_close(collected.candidates[1].score, ln(0.1));
    assert_eq!(collected.progress.len(), 2);
}

#[test]
fn test_variadic_field() {
    let oracle = ScriptedOracle::rules(vec![
        vec![
            (x_to_ys(), ln(0.9)),
            (y_sub(), ln(0.1)),
            (Rule::CloseVariadicField, f64::NEG_INFINITY),
        ],
        vec![
            (Rule::CloseVariadicField, ln(0.1)),
            (y_sub(), ln(0.9)),
            (x_to_ys(), ln(0.5)),
        ],
        vec![(Rule::CloseVariadicField, ln(0.9)), (y_sub(), ln(0.1))],
    ]);
    let mut synthesizer = BeamSearchSynthesizer::new(3, oracle, is_subtype);
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();

    assert_progress(
        &collected.progress[0],
        &[
            (1, 0, ln(0.9), Action::ApplyRule(x_to_ys()), false),
            (2, 0, ln(0.1), Action::ApplyRule(y_sub()), true),
        ],
    );
    assert_progress(
        &collected.progress[1],
        &[
            (3, 1, ln(0.9) + ln(0.9), Action::ApplyRule(y_sub()), false),
            (4, 1, ln(0.9) + ln(0.1), Action::close_variadic(), true),
        ],
    );
    assert_progress(
        &collected.progress[2],
        &[(5, 3, ln(0.9) * 3.0, Action::close_variadic(), true)],
    );

    assert_eq!(
        collected.asts(),
        vec![
            &x(Field::list("value", "Y", vec![ysub()])),
            &ysub(),
            &x(Field::list("value", "Y", vec![])),
        ]
    );
}

#[test]
fn test_token_field() {
    let oracle = ScriptedOracle::new(vec![
        (vec![(x_to_str(), ln(1.0))], vec![]),
        (vec![], vec![(token("foo"), ln(0.9)), (Token::CloseNode, ln(0.1))]),
        (vec![], vec![(Token::CloseNode, ln(1.0)), (token("foo"), f64::NEG_INFINITY)]),
    ]);
    let mut synthesizer = BeamSearchSynthesizer::new(2, oracle, is_subtype);
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();

    assert_progress(
        &collected.progress[0],
        &[(1, 0, 0.0, Action::ApplyRule(x_to_str()), false)],
    );
    assert_progress(
        &collected.progress[1],
        &[
            (2, 1, ln(0.9), Action::token("foo"), false),
            (3, 1, ln(0.1), Action::close_node(), true),
        ],
    );
    assert_progress(
        &collected.progress[2],
        &[(4, 2, ln(0.9), Action::close_node(), true)],
    );

    let leaf = |value: &str| x(Field::single("value", "Str", Ast::leaf("Str", value)));
    assert_eq!(collected.asts(), vec![&leaf("foo"), &leaf("")]);

    // Token heads never read the rule view.
    let oracle = synthesizer.oracle();
    assert_eq!(oracle.forced.rules.get(), 1);
    assert_eq!(oracle.forced.tokens.get(), 2);
}

#[test]
fn test_unsplit_leaf_is_one_token() {
    let oracle = ScriptedOracle::new(vec![
        (vec![(x_to_str(), ln(1.0))], vec![]),
        (vec![], vec![(token("test"), ln(1.0))]),
    ]);
    let mut synthesizer = BeamSearchSynthesizer::new(1, oracle, is_subtype).with_options(ActionOptions {
        retain_variadic_fields: true,
        split_non_terminal: false,
    });
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();

    assert_progress(
        &collected.progress[1],
        &[(2, 1, 0.0, Action::token("test"), true)],
    );
    assert_eq!(
        collected.asts(),
        vec![&x(Field::single("value", "Str", Ast::leaf("Str", "test")))]
    );
}

#[test]
fn test_encoded_lists_only_fill_their_own_field() {
    let table = vec![
        (x_to_ys(), ln(0.5)),
        (y_list(1), ln(0.3)),
        (Rule::CloseVariadicField, ln(0.1)),
        (y_sub(), ln(0.1)),
    ];
    let oracle = ScriptedOracle::rules(vec![table.clone(), table.clone(), table]);
    let mut synthesizer = BeamSearchSynthesizer::new(10, oracle, is_subtype).with_options(ActionOptions {
        retain_variadic_fields: false,
        split_non_terminal: true,
    });
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();

    let actions: Vec<Vec<&Action>> = collected
        .progress
        .iter()
        .map(|round| round.iter().map(|p| &p.action).collect())
        .collect();
    assert_eq!(
        actions,
        vec![
            vec![&Action::ApplyRule(x_to_ys()), &Action::ApplyRule(y_sub())],
            vec![&Action::ApplyRule(y_list(1))],
            vec![&Action::ApplyRule(y_sub())],
        ]
    );
    assert_eq!(
        collected.asts(),
        vec![&ysub(), &x(Field::list("value", "Y", vec![ysub()]))]
    );
}

#[test]
fn test_beam_size_bounds_candidates() {
    let mut synthesizer = BeamSearchSynthesizer::new(1, scenario_a(), is_subtype);
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();
    assert_eq!(collected.asts(), vec![&x(Field::single("value", "Y", ysub()))]);
    assert!(collected.progress.iter().all(|round| round.len() <= 1));
}

#[test]
fn test_max_steps_bounds_oracle_calls() {
    let mut synthesizer =
        BeamSearchSynthesizer::new(2, scenario_a(), is_subtype).with_max_steps(Some(1));
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();
    assert_eq!(collected.asts(), vec![&ysub()]);
    assert_eq!(synthesizer.oracle().calls(), 1);

    let mut synthesizer =
        BeamSearchSynthesizer::new(2, scenario_a(), is_subtype).with_max_steps(Some(0));
    let mut search = synthesizer.synthesize("query").unwrap();
    assert!(search.next().is_none());
    assert_eq!(search.steps(), 0);
    drop(search);
    assert_eq!(synthesizer.oracle().calls(), 0);
}

#[test]
fn test_search_stops_when_nothing_is_admissible() {
    let oracle = ScriptedOracle::rules(vec![vec![(Rule::CloseVariadicField, ln(1.0))]]);
    let mut synthesizer = BeamSearchSynthesizer::new(5, oracle, is_subtype);
    let collected = collect(synthesizer.synthesize("query").unwrap()).unwrap();
    assert!(collected.candidates.is_empty());
    assert_eq!(collected.progress, vec![vec![]]);
    assert_eq!(synthesizer.oracle().calls(), 1);
}

#[test]
fn test_rounds_can_be_pulled_one_at_a_time() {
    let mut synthesizer = BeamSearchSynthesizer::new(2, scenario_a(), is_subtype);
    let mut search = synthesizer.synthesize("query").unwrap();
    let first = search.next().unwrap().unwrap();
    assert_eq!(first.candidates.len(), 1);
    assert_eq!(search.live().len(), 1);
    assert_eq!(search.live()[0].id, 1);
    assert_eq!(search.steps(), 1);
    drop(search);
    assert_eq!(synthesizer.oracle().calls(), 1);
}

#[test]
fn test_oracle_length_mismatch_is_fatal() {
    let mut oracle = scenario_a();
    oracle.truncate = true;
    let mut synthesizer = BeamSearchSynthesizer::new(2, oracle, is_subtype);
    let mut search = synthesizer.synthesize("query").unwrap();
    let err = search.next().unwrap().unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Oracle);
    assert!(search.next().is_none());
}

#[test]
fn test_from_config_rejects_empty_beam() {
    let config = SynthesizerConfig {
        beam_size: 0,
        ..SynthesizerConfig::default()
    };
    let err = BeamSearchSynthesizer::from_config(config, scenario_a(), is_subtype)
        .err()
        .unwrap();
    assert_eq!(err.error_type(), ErrorType::Config);
}
