use super::*;

#[test]
fn test_runner() {
    let runner = Runner::spawn("adder", move || (0..10).sum::<i32>());
    assert_eq!(runner.to_name(), "adder");
    assert_eq!(runner.join().unwrap(), 45);
}

#[test]
fn test_runner_panic() {
    let runner: Runner<()> = Runner::spawn("boom", move || panic!("boom"));
    match runner.join() {
        Err(Error::ThreadFail(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}
