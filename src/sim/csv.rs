use std::io::{self, Write};
use std::path::Path;

use super::runner::Sample;
use crate::systems::Direction;

/// Write flight samples in CSV format.
///
/// Columns: tick, time, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z, speed,
///          fwd_x, fwd_y, fwd_z, state, distance, displacement,
///          thrust_forward, thrust_back, thrust_up, thrust_down,
///          thrust_left, thrust_right
pub fn write_trajectory<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    writeln!(
        writer,
        "tick,time,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,speed,\
         fwd_x,fwd_y,fwd_z,state,distance,displacement,\
         thrust_forward,thrust_back,thrust_up,thrust_down,thrust_left,thrust_right"
    )?;

    for s in samples {
        let b = &s.body;
        let fwd = b.forward();
        write!(
            writer,
            "{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},\
             {:.6},{:.6},{:.6},{},{:.3},{:.3}",
            s.tick,
            b.time,
            b.pos.x, b.pos.y, b.pos.z,
            b.vel.x, b.vel.y, b.vel.z,
            b.speed(),
            fwd.x, fwd.y, fwd.z,
            s.bot_state,
            s.distance,
            s.displacement,
        )?;
        for d in Direction::ALL {
            write!(writer, ",{:.2}", s.thrust[d])?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write samples to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, samples: &[Sample]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, samples)?;
    file.flush()
}
