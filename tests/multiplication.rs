use std::fs;
use std::sync::Arc;
use tally::encoder::{decode_product, encode_operands};
use tally::programs::{ProgramManager, MULTIPLICATION};
use tally::{
    multiplication, write_state_count, Sampler, TapeLog, TransitionTable, TuringMachine,
    TuringMachineError,
};
use tempfile::tempdir;

#[test]
fn thirteen_squared() {
    let mut machine = TuringMachine::new(multiplication().unwrap());

    let steps = machine.run("1101#1101$").unwrap();

    assert_eq!(steps, 820);
    assert_eq!(machine.tape_content(), "10101001");
    assert_eq!(decode_product(&machine.tape_content()).unwrap(), 169);
    assert_eq!(machine.state(), "halt");
}

#[test]
fn reference_runs() {
    let cases = [
        ("1#1$", 57, "1"),
        ("10#11$", 142, "110"),
        ("11#11$", 200, "1001"),
        ("110#111$", 403, "101010"),
        ("111#1$", 259, "111"),
        ("1#111$", 119, "111"),
        ("11101#11101$", 1547, "1101001001"),
        ("101111#101001$", 2358, "11110000111"),
        ("101001010111#101000101$", 8566, "11010010000001110011"),
    ];

    let mut machine = TuringMachine::new(multiplication().unwrap());
    for (input, steps, tape) in cases {
        assert_eq!(machine.run(input).unwrap(), steps, "steps for {input}");
        assert_eq!(machine.tape_content(), tape, "tape for {input}");
    }
}

#[test]
fn input_without_terminator_needs_a_step_ceiling() {
    // Without `$` the machine scans right over blanks forever.
    let mut machine = TuringMachine::new(multiplication().unwrap());

    let error = machine.run_with_limit("11#11", Some(10_000)).unwrap_err();
    assert_eq!(error, TuringMachineError::StepLimitExceeded(10_000));
    assert_eq!(machine.state(), "90");
}

#[test]
fn missing_first_rule_fails_immediately() {
    let table = TransitionTable::builder()
        .final_state("halt")
        .build("start 1 1 R halt\n")
        .unwrap();
    let mut machine = TuringMachine::new(Arc::new(table));

    let error = machine.run("0").unwrap_err();
    assert_eq!(
        error,
        TuringMachineError::UndefinedTransition {
            state: "start".into(),
            symbol: '0',
        }
    );
    assert_eq!(
        error.to_string(),
        "No transition defined for state 'start' and symbol '0'"
    );
}

#[test]
fn output_files() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("output.dat");
    let count_path = dir.path().join("states_count.txt");

    let mut machine =
        TuringMachine::new(multiplication().unwrap()).with_sink(TapeLog::create(&log_path).unwrap());
    machine.run("101001010111#101000101$").unwrap();
    machine.run("101111#101001$").unwrap();

    write_state_count(&count_path, machine.state_count()).unwrap();

    assert_eq!(
        fs::read_to_string(&log_path).unwrap(),
        "11010010000001110011\n11110000111\n"
    );
    assert_eq!(fs::read_to_string(&count_path).unwrap(), "46\n");
}

#[test]
fn sampled_tapes_multiply_correctly() {
    let table = ProgramManager::get_table(MULTIPLICATION).unwrap();
    let sampler = Sampler::new(Arc::clone(&table)).samples(8).seed(3);
    let mut machine = TuringMachine::new(table);

    for (a, b) in sampler.operand_pairs(6, 4).unwrap() {
        machine.run(&encode_operands(a, b)).unwrap();

        let x = (1u128 << 6) + a as u128;
        let y = (1u128 << 4) + b as u128;
        assert_eq!(decode_product(&machine.tape_content()).unwrap(), x * y);
    }
}

#[test]
fn sampled_step_counts_match_individual_runs() {
    let table = multiplication().unwrap();
    let sampler = Sampler::new(Arc::clone(&table)).samples(6).threads(3);
    let mut machine = TuringMachine::new(table);

    let pairs = sampler.operand_pairs(4, 5).unwrap();
    let steps = sampler.steps_count(4, 5).unwrap();

    assert_eq!(pairs.len(), steps.len());
    for ((a, b), expected) in pairs.into_iter().zip(steps) {
        assert_eq!(machine.run(&encode_operands(a, b)).unwrap(), expected);
    }
}
