use super::Learner;
use crate::Error;
use crate::Label;
use crate::Probability;
use crate::save::Binary;
use byteorder::BE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use std::io::BufRead;
use std::io::Write;

/// gradient boosting delegated to an external command-line binary.
/// the contract degrades to: write csv, shell out, read one float per
/// line. kept as a pluggable back-end, never part of the core engine.
#[derive(Debug, Clone, PartialEq)]
pub struct External {
    pub exec_path: String,
    pub num_leaves: usize,
    pub max_depth: i32,
    pub min_data_in_leaf: usize,
    pub num_iterations: usize,
    pub learning_rate: f64,
    pub device: String,
    pub model_path: String,
    pub work_dir: String,
}

impl Default for External {
    fn default() -> Self {
        Self {
            exec_path: "lightgbm".into(),
            num_leaves: 31,
            max_depth: -1,
            min_data_in_leaf: 100,
            num_iterations: 200,
            learning_rate: 0.1,
            device: "cpu".into(),
            model_path: "models/lgbm_model.txt".into(),
            work_dir: "data".into(),
        }
    }
}

impl External {
    pub fn fitted(&self) -> bool {
        std::fs::metadata(&self.model_path).is_ok()
    }

    fn place(&self, file: &str) -> String {
        format!("{}/{}", self.work_dir, file)
    }

    /// label-first csv, no header, the layout the binary expects
    fn export(&self, path: &str, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        for (row, label) in x.iter().zip(y.iter()) {
            write!(out, "{}", label)?;
            for v in row {
                write!(out, ",{}", v)?;
            }
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    fn train_config(&self, data: &str) -> String {
        format!(
            concat!(
                "task=train\nboosting=gbdt\nobjective=binary\nmetric=auc\n",
                "data={}\nheader=false\nlabel_column=0\n",
                "num_leaves={}\nmax_depth={}\nmin_data_in_leaf={}\n",
                "num_iterations={}\nlearning_rate={}\n",
                "device={}\noutput_model={}\n"
            ),
            data,
            self.num_leaves,
            self.max_depth,
            self.min_data_in_leaf,
            self.num_iterations,
            self.learning_rate,
            self.device,
            self.model_path,
        )
    }

    fn predict_config(&self, data: &str, result: &str) -> String {
        format!(
            "task=predict\ninput_model={}\ndata={}\nheader=false\nlabel_column=0\noutput_result={}\n",
            self.model_path, data, result,
        )
    }

    fn invoke(&self, config: &str) -> Result<(), Error> {
        let status = std::process::Command::new(&self.exec_path)
            .arg(format!("config={}", config))
            .status()
            .map_err(|e| Error::External(format!("spawn {}: {}", self.exec_path, e)))?;
        match status.success() {
            true => Ok(()),
            false => Err(Error::External(format!(
                "{} exited with {}",
                self.exec_path, status
            ))),
        }
    }

    /// the fallible predict path; the Learner impl degrades it to the
    /// sentinel so the contract stays infallible
    fn scores(&self, x: &[Vec<f64>]) -> Result<Vec<Probability>, Error> {
        let data = self.place("lgbm_pred.csv");
        let config = self.place("lgbm_predict.conf");
        let result = self.place("lgbm_preds.txt");
        self.export(&data, x, &vec![0; x.len()])?;
        std::fs::write(&config, self.predict_config(&data, &result))?;
        self.invoke(&config)?;
        let file = std::fs::File::open(&result)
            .map_err(|_| Error::External(format!("no predictions at {}", result)))?;
        let mut out = Vec::with_capacity(x.len());
        for line in std::io::BufReader::new(file).lines() {
            let line = line?;
            if let Ok(v) = line.trim().parse::<f64>() {
                out.push(v);
            }
        }
        match out.len() == x.len() {
            true => Ok(out),
            false => Err(Error::External(format!(
                "{} predictions for {} rows",
                out.len(),
                x.len()
            ))),
        }
    }
}

impl Learner for External {
    fn name(&self) -> &'static str {
        match self.device.as_str() {
            "gpu" => "LightGBM(GPU)",
            _ => "LightGBM(CPU)",
        }
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
        super::validate(x, y)?;
        std::fs::create_dir_all(&self.work_dir)?;
        if let Some(parent) = std::path::Path::new(&self.model_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = self.place("lgbm_train.csv");
        let config = self.place("lgbm_train.conf");
        self.export(&data, x, y)?;
        std::fs::write(&config, self.train_config(&data))?;
        self.invoke(&config)?;
        match std::fs::metadata(&self.model_path).is_ok() {
            true => Ok(()),
            false => Err(Error::External(format!(
                "no model at {} after training",
                self.model_path
            ))),
        }
    }

    fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability> {
        match self.scores(x) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("external backend predict failed: {}", e);
                vec![crate::UNFIT_PROBABILITY; x.len()]
            }
        }
    }
}

impl Binary for External {
    const TAG: u8 = 5;

    fn encode<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        let text = |w: &mut W, s: &str| -> std::io::Result<()> {
            w.write_u32::<BE>(s.len() as u32)?;
            w.write_all(s.as_bytes())
        };
        text(w, &self.exec_path)?;
        w.write_u32::<BE>(self.num_leaves as u32)?;
        w.write_i32::<BE>(self.max_depth)?;
        w.write_u32::<BE>(self.min_data_in_leaf as u32)?;
        w.write_u32::<BE>(self.num_iterations as u32)?;
        w.write_f64::<BE>(self.learning_rate)?;
        text(w, &self.device)?;
        text(w, &self.model_path)?;
        text(w, &self.work_dir)?;
        Ok(())
    }

    fn decode<R: std::io::Read>(r: &mut R) -> std::io::Result<Self> {
        let text = |r: &mut R| -> std::io::Result<String> {
            let len = r.read_u32::<BE>()? as usize;
            let mut buf = vec![0u8; len];
            r.read_exact(&mut buf)?;
            String::from_utf8(buf)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        };
        Ok(Self {
            exec_path: text(r)?,
            num_leaves: r.read_u32::<BE>()? as usize,
            max_depth: r.read_i32::<BE>()?,
            min_data_in_leaf: r.read_u32::<BE>()? as usize,
            num_iterations: r.read_u32::<BE>()? as usize,
            learning_rate: r.read_f64::<BE>()?,
            device: text(r)?,
            model_path: text(r)?,
            work_dir: text(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_config_carries_every_hyperparameter() {
        let backend = External::default();
        let config = backend.train_config("data/train.csv");
        assert!(config.contains("task=train"));
        assert!(config.contains("objective=binary"));
        assert!(config.contains("num_leaves=31"));
        assert!(config.contains("max_depth=-1"));
        assert!(config.contains("min_data_in_leaf=100"));
        assert!(config.contains("num_iterations=200"));
        assert!(config.contains("device=cpu"));
    }

    #[test]
    fn name_follows_the_device() {
        let mut backend = External::default();
        assert!(backend.name() == "LightGBM(CPU)");
        backend.device = "gpu".into();
        assert!(backend.name() == "LightGBM(GPU)");
    }

    #[test]
    fn missing_binary_is_a_typed_failure() {
        let scratch = std::env::temp_dir().join("antifraud-external-test");
        let mut backend = External {
            exec_path: "definitely-not-a-real-binary".into(),
            work_dir: scratch.to_string_lossy().into_owned(),
            model_path: scratch.join("model.txt").to_string_lossy().into_owned(),
            ..External::default()
        };
        let x = vec![vec![1., 2.], vec![3., 4.]];
        let y = vec![0, 1];
        assert!(matches!(backend.fit(&x, &y), Err(Error::External(_))));
    }

    #[test]
    fn codec_round_trip_preserves_the_config() {
        let backend = External::default();
        let mut bytes = vec![];
        backend.encode(&mut bytes).unwrap();
        assert!(External::decode(&mut bytes.as_slice()).unwrap() == backend);
    }
}
