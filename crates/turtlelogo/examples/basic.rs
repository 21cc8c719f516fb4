use turtlelogo::{Program, Recorder};

fn main() {
    let prog = Program::parse("to square :n repeat 4 [fd :n rt 90] end square 90").unwrap();
    let mut rec = Recorder::default();
    let state = prog.exec(&mut rec).unwrap();
    for seg in &rec.segments {
        println!("{seg}");
    }
    dbg!(state.heading);
}
