//! End-to-end pipeline scenarios over in-memory source.

use basc_drv::compile_to_assembly;

/// Assert that every needle occurs in `text`, in the given order.
fn assert_in_order(text: &str, needles: &[&str]) {
    let mut offset = 0;
    for needle in needles {
        match text[offset..].find(needle) {
            Some(found) => offset += found + needle.len(),
            None => panic!("{:?} not found in order in:\n{}", needle, text),
        }
    }
}

#[test]
fn constant_print() {
    let text = compile_to_assembly("10 PRINT \"HI\"\n").unwrap();
    assert_in_order(
        &text,
        &["L10:", "\tMOV\t#ST1, R0", "\tCALL\tWRSTR", "\tCALL\tWRCRLF"],
    );
    assert!(text.contains("ST1:\t.ASCII\t<2>/HI/"), "text:\n{}", text);
}

#[test]
fn assignment_folding() {
    let text = compile_to_assembly("10 LET A% = 3 + 4\n").unwrap();
    assert!(text.contains("\tMOV\t#7., VARA$I"), "text:\n{}", text);
    // No arithmetic survives to runtime.
    assert!(!text.contains("\tADD\t"), "text:\n{}", text);
}

#[test]
fn counted_loop() {
    let text =
        compile_to_assembly("10 FOR I%=1 TO 3\n20 PRINT I%\n30 NEXT I%\n").unwrap();
    assert_in_order(
        &text,
        &[
            "\tMOV\t#1., VARI$I",
            "N10:\tCMP\t#3., VARI$I",
            "\tBHIS\t",
            "\tJMP\tX10",
            "\tINC\tVARI$I",
            "\tJMP\tN10",
            "X10:",
        ],
    );
}

#[test]
fn peephole_increment() {
    let text = compile_to_assembly("10 LET I% = I% + 1\n").unwrap();
    assert!(text.contains("\tINC\tVARI$I"), "text:\n{}", text);
    assert!(!text.contains("R0"), "no register traffic expected:\n{}", text);
}

#[test]
fn string_concatenation_fold() {
    let text = compile_to_assembly("10 PRINT \"AB\" \"CD\"\n").unwrap();
    assert!(text.contains("ST1:\t.ASCII\t<4>/ABCD/"), "text:\n{}", text);
    assert!(!text.contains("/AB/"), "unmerged string in:\n{}", text);
    assert!(!text.contains("ST2"), "single intern expected:\n{}", text);
}

#[test]
fn bad_jump_fails_validation() {
    let err = compile_to_assembly("10 GOTO 99\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Validation ERRORS: 1"), "{}", message);
    assert!(message.contains("Invalid line number 99"), "{}", message);
}

#[test]
fn emission_ordering_invariant() {
    let text = compile_to_assembly(
        "10 LET A% = 1\n20 PRINT \"X\"; A%\n30 IF A% > 0 THEN 50\n40 REM SKIPPED\n50 END\n",
    )
    .unwrap();
    assert_in_order(
        &text,
        &[
            "\t.MCALL\t.EXIT",
            "START:",
            "L10:",
            "L20:",
            "L30:",
            "L40:",
            "L50:",
            "L65536:",
            "\t.EXIT",
            "; STRINGS",
            "\t.EVEN",
            "; VARIABLES",
            "\t.END\tSTART",
        ],
    );
}

#[test]
fn string_interning_is_unique() {
    let text = compile_to_assembly(
        "10 PRINT \"SAME\"\n20 PRINT \"SAME\"\n30 LET S$ = \"SAME\"\n",
    )
    .unwrap();
    assert_eq!(text.matches("/SAME/").count(), 1, "text:\n{}", text);
    assert!(text.contains("ST1"), "text:\n{}", text);
    assert!(!text.contains("ST2"), "text:\n{}", text);
}

#[test]
fn no_todo_in_supported_subset() {
    let text = compile_to_assembly(
        "10 REM COUNTDOWN\n\
         20 LET N% = 10\n\
         30 PRINT \"COUNT\"; N%\n\
         40 LET N% = N% - 1\n\
         50 IF N% > 0 THEN 30\n\
         60 FOR I% = 1 TO 3\n\
         70 BEEP\n\
         80 NEXT I%\n\
         90 END\n",
    )
    .unwrap();
    assert!(!text.contains("TODO"), "residual TODO in:\n{}", text);
}

#[test]
fn gosub_return_roundtrip() {
    let text = compile_to_assembly(
        "10 GOSUB 40\n20 PRINT \"BACK\"\n30 END\n40 PRINT \"SUB\"\n50 RETURN\n",
    )
    .unwrap();
    assert_in_order(&text, &["\tCALL\tL40", "L40:", "\tRETURN"]);
}

#[test]
fn on_gosub_dispatch() {
    let text = compile_to_assembly(
        "10 LET K% = 2\n20 ON K% GOSUB 40, 50\n30 END\n40 RETURN\n50 RETURN\n",
    )
    .unwrap();
    assert_in_order(
        &text,
        &[
            "\tDEC\tR0",
            "\tASL\tR0",
            "\tCALL\t@10$(R0)",
            "10$:\t.WORD\tL40",
            "\t.WORD\tL50",
        ],
    );
}

#[test]
fn multiple_errors_reported_together() {
    let err = compile_to_assembly("10 GOTO 99\n20 GOSUB 88\n30 END\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Validation ERRORS: 2"), "{}", message);
    assert!(message.contains("Invalid line number 99"), "{}", message);
    assert!(message.contains("Invalid line number 88"), "{}", message);
}

#[test]
fn data_read_restore_are_acknowledged_gaps() {
    let text = compile_to_assembly(
        "10 DATA 1, 2, 3\n20 READ A%\n30 RESTORE 10\n40 END\n",
    )
    .unwrap();
    assert!(text.contains("; TODO DATA"), "text:\n{}", text);
    assert!(text.contains("; TODO READ"), "text:\n{}", text);
    assert!(text.contains("; TODO RESTORE"), "text:\n{}", text);
}

#[test]
fn variables_area_shapes() {
    let text = compile_to_assembly(
        "10 LET I% = 1\n20 LET X = 2.5\n30 LET S$ = \"T\"\n40 DIM M%(9)\n",
    )
    .unwrap();
    assert!(text.contains("VARI$I:\t.WORD\t0\t; I%"), "text:\n{}", text);
    assert!(text.contains("VARX:\t.WORD\t0,0\t; X"), "text:\n{}", text);
    assert!(text.contains("VARS$S:\t.BLKB\t256.\t; S$"), "text:\n{}", text);
    assert!(text.contains("VARM$I:\t.BLKB\t20.\t; M%"), "text:\n{}", text);
}

#[test]
fn if_else_branches() {
    let text = compile_to_assembly(
        "10 IF A% = 0 THEN 30 ELSE 40\n20 REM\n30 REM\n40 END\n",
    )
    .unwrap();
    assert_in_order(&text, &["\tBNE\t10$", "\tJMP\tL30", "10$:\tJMP\tL40"]);
}

#[test]
fn input_prompt_and_integer_targets() {
    let text = compile_to_assembly("10 INPUT \"N\"; A%, B%\n").unwrap();
    assert_in_order(
        &text,
        &[
            "\tCALL\tWRSTR\t; print the prompt",
            "\tCALL\tREADI",
            "\tMOV\tR0, VARA$I",
            "\tCALL\tREADI",
            "\tMOV\tR0, VARB$I",
        ],
    );
}
